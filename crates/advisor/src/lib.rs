//! Portfolio scoring and advisory actions.
//!
//! This crate turns a [`Snapshot`](defi_engine_domain::entities::Snapshot)
//! into a scored analysis and ordered lists of rebalance and compound
//! recommendations:
//! - Health factor, weighted APY and risk score
//! - Health-restoring repayments and yield-seeking capital moves
//! - Compound / rebalance / hold decisions for liquidity positions
//! - Gas-aware profitability gating
//!
//! Every function here is pure: the caller executes actions and re-scores a
//! fresh snapshot afterwards.

/// Prelude module for convenient imports.
pub mod prelude;

/// Compound recommender for LP positions.
pub mod compound;
/// Configuration for scoring and recommendation policies.
pub mod config;
/// Gas cost versus yield gain checks.
pub mod gas;
/// Rebalance recommender for money-market positions.
pub mod rebalance;
/// Health and risk scorer.
pub mod scorer;
