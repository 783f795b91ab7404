//! Ranking of backtest results.

/// Objective functions and ranking.
pub mod objective;

pub use objective::{
    MaximizeNetReturn, MaximizeSharpeRatio, MinimizeDrawdown, Objective, ObjectiveFunction,
    rank_results,
};
