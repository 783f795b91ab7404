//! Domain model for the DeFi portfolio engine.
//!
//! Snapshots of lending, borrowing and liquidity-pool positions, the protocol
//! metadata they reference, backtest scenarios, and the value objects the
//! scorer, recommenders and backtester produce.

/// Entities captured from the outside world.
pub mod entities;
/// Closed enumerations shared across the engine.
pub mod enums;
/// Engine error type.
pub mod error;
/// Yield and impermanent-loss math.
pub mod metrics;
/// Derived outputs of the engine.
pub mod value_objects;

pub use error::{EngineError, EngineResult};
