//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use defi_engine_simulation::prelude::*;
//! ```

// Backtester
pub use crate::backtester::{Backtester, StrategyRun};

// Config
pub use crate::config::{BacktestConfig, RiskProfiles, TierProfile};

// Events
pub use crate::event::{EventData, EventLog, SimulationEvent, SimulationEventType};

// Market analysis
pub use crate::market_analysis::analyze_market;

// Monte Carlo
pub use crate::monte_carlo::{AggregateResult, MonteCarloRunner};

// Price paths
pub use crate::price_path::{
    MarketParams, MarketPath, MarketPathGenerator, MarketStep, PathGenerator,
};

// State
pub use crate::state::PositionState;

// Strategies
pub use crate::strategies::{
    PeriodicPolicy, PolicyKind, RebalanceReason, StepDecision, StepPolicy, StrategyContext,
    ThresholdPolicy,
};

// Cancellation
pub use tokio_util::sync::CancellationToken;
