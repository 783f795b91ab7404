//! Monte Carlo runner: one scenario over many consecutive seeds.

use crate::backtester::Backtester;
use crate::metrics::percentile;
use defi_engine_domain::entities::BacktestScenario;
use defi_engine_domain::metrics::apy::to_decimal;
use defi_engine_domain::value_objects::BacktestResult;
use defi_engine_domain::{EngineError, EngineResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Repeats a backtest over consecutive seeds.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner {
    pub backtester: Backtester,
    pub scenario: BacktestScenario,
    pub iterations: usize,
    /// Seed of the first iteration; iteration `i` uses `base_seed + i`.
    pub base_seed: u64,
}

/// Distribution of one strategy's results across iterations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub strategy: String,
    pub mean_net_return: Decimal,
    pub median_net_return: Decimal,
    /// Value at Risk (5th percentile net return).
    pub var_95_net_return: Decimal,
    pub mean_sharpe_ratio: Decimal,
    pub mean_max_drawdown: Decimal,
    pub iterations: usize,
}

impl MonteCarloRunner {
    #[must_use]
    pub fn new(backtester: Backtester, scenario: BacktestScenario, iterations: usize) -> Self {
        Self {
            backtester,
            scenario,
            iterations,
            base_seed: 0,
        }
    }

    #[must_use]
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// One aggregate per strategy, in scenario order.
    ///
    /// # Errors
    /// Any error of [`Backtester::run`], or an invalid configuration when
    /// `iterations` is zero.
    pub fn run(&self, cancel: &CancellationToken) -> EngineResult<Vec<AggregateResult>> {
        if self.iterations == 0 {
            return Err(EngineError::invalid_config(
                "monteCarlo.iterations",
                "must be at least 1",
            ));
        }

        info!(
            iterations = self.iterations,
            base_seed = self.base_seed,
            "Running Monte Carlo backtest"
        );

        let mut per_strategy: Vec<Vec<BacktestResult>> =
            vec![Vec::new(); self.scenario.strategies.len()];

        for i in 0..self.iterations {
            let seed = self.base_seed.wrapping_add(i as u64);
            let results = self.backtester.run(&self.scenario, seed, cancel)?;
            for (bucket, result) in per_strategy.iter_mut().zip(results) {
                bucket.push(result);
            }
        }

        Ok(per_strategy.into_iter().map(aggregate).collect())
    }
}

fn aggregate(results: Vec<BacktestResult>) -> AggregateResult {
    let count = results.len().max(1) as f64;
    let mean = |f: fn(&BacktestResult) -> Decimal| {
        results.iter().map(|r| f(r).to_f64().unwrap_or(0.0)).sum::<f64>() / count
    };

    let mut returns: Vec<f64> = results
        .iter()
        .map(|r| r.net_return.to_f64().unwrap_or(0.0))
        .collect();
    returns.sort_by(f64::total_cmp);

    AggregateResult {
        strategy: results
            .first()
            .map(|r| r.strategy.clone())
            .unwrap_or_default(),
        mean_net_return: to_decimal(mean(|r| r.net_return)).round_dp(2),
        median_net_return: to_decimal(percentile(&returns, 0.5)).round_dp(2),
        var_95_net_return: to_decimal(percentile(&returns, 0.05)).round_dp(2),
        mean_sharpe_ratio: to_decimal(mean(|r| r.sharpe_ratio)).round_dp(3),
        mean_max_drawdown: to_decimal(mean(|r| r.max_drawdown)).round_dp(2),
        iterations: results.len(),
    }
}
