//! Strategy backtesting for DeFi yield positions.
//!
//! This crate replays named strategies against seeded or historical market
//! paths and reports return, drawdown, Sharpe ratio, win rate and gas cost:
//! - Seeded GBM and Ornstein-Uhlenbeck paths per market condition
//! - Per-step compound and rebalance policies
//! - Cooperative cancellation between steps
//! - Monte Carlo aggregation and market regime analysis

/// Prelude module for convenient imports.
pub mod prelude;

/// Backtest driver.
pub mod backtester;
/// Backtest configuration and risk-tier profiles.
pub mod config;
/// Events recorded during a run.
pub mod event;
/// Regime classification of price series.
pub mod market_analysis;
/// Drawdown, Sharpe ratio and win-rate statistics.
pub mod metrics;
/// Monte Carlo aggregation over seeds.
pub mod monte_carlo;
/// Market path generation.
pub mod price_path;
/// Simulated position state.
pub mod state;
/// Per-step trade policies.
pub mod strategies;
