//! In-memory providers for tests and embedding.

use super::{HistoricalPriceSource, PriceSeries, SnapshotProvider, StrategyCatalog};
use crate::error::DataResult;
use async_trait::async_trait;
use defi_engine_domain::entities::{Snapshot, StrategySpec};

/// Serves a fixed snapshot.
#[derive(Debug, Clone)]
pub struct InMemorySnapshot {
    snapshot: Snapshot,
}

impl InMemorySnapshot {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotProvider for InMemorySnapshot {
    async fn snapshot(&self) -> DataResult<Snapshot> {
        self.snapshot.validate()?;
        Ok(self.snapshot.clone())
    }
}

/// Serves a fixed strategy list.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    strategies: Vec<StrategySpec>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(strategies: Vec<StrategySpec>) -> Self {
        Self { strategies }
    }

    /// The built-in strategy catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(StrategySpec::default_catalog())
    }
}

#[async_trait]
impl StrategyCatalog for StaticCatalog {
    async fn strategies(&self) -> DataResult<Vec<StrategySpec>> {
        Ok(self.strategies.clone())
    }
}

/// Serves a fixed price series.
#[derive(Debug, Clone)]
pub struct InMemoryPrices {
    series: PriceSeries,
}

impl InMemoryPrices {
    #[must_use]
    pub fn new(series: PriceSeries) -> Self {
        Self { series }
    }
}

#[async_trait]
impl HistoricalPriceSource for InMemoryPrices {
    async fn prices(&self) -> DataResult<PriceSeries> {
        Ok(self.series.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use defi_engine_domain::entities::{Position, ProtocolInfo};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_catalog_lookup_ignores_case() {
        let catalog = StaticCatalog::builtin();
        let spec = catalog.find("balanced lp").await.unwrap();
        assert_eq!(spec.name, "Balanced LP");

        let missing = catalog.find("Moon Farming").await.unwrap_err();
        assert!(matches!(missing, DataError::StrategyNotFound(name) if name == "Moon Farming"));
    }

    #[tokio::test]
    async fn test_snapshot_is_validated() {
        let bad = Snapshot::new(ProtocolInfo::base_catalog())
            .with_position(Position::lending("Nowhere", "USDC", dec!(10), dec!(1)));
        let err = InMemorySnapshot::new(bad).snapshot().await.unwrap_err();
        assert!(matches!(err, DataError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_prices_round_trip() {
        let series = PriceSeries::daily(vec![dec!(1), dec!(2)]);
        let source = InMemoryPrices::new(series.clone());
        assert_eq!(source.prices().await.unwrap(), series);
    }
}
