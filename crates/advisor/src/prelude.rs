//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use defi_engine_advisor::prelude::*;
//! ```

// Compound
pub use crate::compound::recommend_compound;

// Config
pub use crate::config::{
    CollateralFactors, CompoundConfig, HealthPolicy, RebalanceConfig, ScoringConfig,
};

// Gas
pub use crate::gas::{GasPolicy, ProfitabilityCheck};

// Rebalance
pub use crate::rebalance::recommend_rebalance;

// Scorer
pub use crate::scorer::score;
