//! Collaborator seams of the engine.

pub mod json;
pub mod memory;

use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use defi_engine_domain::entities::{Snapshot, StrategySpec};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supplies the current portfolio snapshot.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Returns a validated snapshot.
    async fn snapshot(&self) -> DataResult<Snapshot>;
}

/// Supplies the strategies a backtest can choose from.
#[async_trait]
pub trait StrategyCatalog: Send + Sync {
    async fn strategies(&self) -> DataResult<Vec<StrategySpec>>;

    /// Looks a strategy up by name, ignoring case.
    async fn find(&self, name: &str) -> DataResult<StrategySpec> {
        self.strategies()
            .await?
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::StrategyNotFound(name.to_string()))
    }
}

/// Supplies a historical price series for non-synthetic backtests.
#[async_trait]
pub trait HistoricalPriceSource: Send + Sync {
    async fn prices(&self) -> DataResult<PriceSeries>;
}

/// Ordered prices sampled at a fixed resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    #[serde(default = "default_steps_per_day")]
    pub steps_per_day: u32,
    pub prices: Vec<Decimal>,
}

fn default_steps_per_day() -> u32 {
    1
}

impl PriceSeries {
    #[must_use]
    pub fn daily(prices: Vec<Decimal>) -> Self {
        Self {
            steps_per_day: 1,
            prices,
        }
    }
}
