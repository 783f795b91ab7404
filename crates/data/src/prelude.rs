//! Prelude module for convenient imports.
//!
//! ```rust
//! use defi_engine_data::prelude::*;
//! ```

pub use crate::error::{DataError, DataResult};
pub use crate::providers::json::{JsonPriceFile, JsonSnapshotFile, JsonStrategyFile, load_json};
pub use crate::providers::memory::{InMemoryPrices, InMemorySnapshot, StaticCatalog};
pub use crate::providers::{HistoricalPriceSource, PriceSeries, SnapshotProvider, StrategyCatalog};
