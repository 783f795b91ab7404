//! JSON-file providers.
//!
//! Files are read on every call, so edits are picked up without a restart.

use super::{HistoricalPriceSource, PriceSeries, SnapshotProvider, StrategyCatalog};
use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use defi_engine_domain::entities::{Snapshot, StrategySpec};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads and deserializes a JSON file.
///
/// # Errors
/// Returns [`DataError::Io`] or [`DataError::Json`] naming the file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> DataResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = raw.len(), "Loaded JSON file");
    serde_json::from_str(&raw).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Snapshot stored as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotProvider for JsonSnapshotFile {
    async fn snapshot(&self) -> DataResult<Snapshot> {
        let snapshot: Snapshot = load_json(&self.path).await?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Strategy list stored as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonStrategyFile {
    path: PathBuf,
}

impl JsonStrategyFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StrategyCatalog for JsonStrategyFile {
    async fn strategies(&self) -> DataResult<Vec<StrategySpec>> {
        load_json(&self.path).await
    }
}

/// Accepted layouts of a price file.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceFile {
    Series(PriceSeries),
    Bare(Vec<Decimal>),
}

/// Price history stored either as a bare JSON array of prices or as
/// `{"stepsPerDay": n, "prices": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonPriceFile {
    path: PathBuf,
}

impl JsonPriceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistoricalPriceSource for JsonPriceFile {
    async fn prices(&self) -> DataResult<PriceSeries> {
        Ok(match load_json::<PriceFile>(&self.path).await? {
            PriceFile::Series(series) => series,
            PriceFile::Bare(prices) => PriceSeries::daily(prices),
        })
    }
}
