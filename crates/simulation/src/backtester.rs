//! Strategy backtester.
//!
//! Replays every strategy of a [`BacktestScenario`] against one shared market
//! path. Strategies never share capital; each owns a [`PositionState`] and is
//! driven by the configured [`StepPolicy`].

use crate::config::BacktestConfig;
use crate::event::{EventLog, SimulationEvent};
use crate::metrics::{max_drawdown_pct, sharpe_ratio, step_returns, win_rate_pct};
use crate::price_path::{MarketPath, MarketPathGenerator, PathGenerator};
use crate::state::PositionState;
use crate::strategies::{StepPolicy, StrategyContext};
use defi_engine_domain::entities::{BacktestScenario, StrategySpec};
use defi_engine_domain::metrics::annualize_return;
use defi_engine_domain::metrics::apy::to_decimal;
use defi_engine_domain::value_objects::BacktestResult;
use defi_engine_domain::{EngineError, EngineResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Full trace of one strategy's run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    pub result: BacktestResult,
    /// Equity net of gas, opening value first.
    pub equity_curve: Vec<f64>,
    pub step_returns: Vec<f64>,
    pub events: Vec<SimulationEvent>,
}

/// Runs backtest scenarios.
#[derive(Debug, Clone, Default)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    #[must_use]
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Synthetic path for `scenario`, fully determined by `seed`.
    ///
    /// # Errors
    /// [`EngineError::InvalidScenario`] when the duration exceeds the
    /// configured step limit.
    pub fn generate_path(&self, scenario: &BacktestScenario, seed: u64) -> EngineResult<MarketPath> {
        let steps = self.config.path_steps(scenario.duration_days)?;
        Ok(MarketPathGenerator::new(scenario.market_condition, seed)
            .with_initial_price(self.config.initial_price.to_f64().unwrap_or(100.0))
            .with_steps_per_day(self.config.steps_per_day)
            .generate(steps))
    }

    /// One result per strategy, in scenario order.
    ///
    /// # Errors
    /// [`EngineError::InvalidScenario`] or [`EngineError::InvalidConfig`]
    /// before any step runs; [`EngineError::Cancelled`] if `cancel` fires.
    pub fn run(
        &self,
        scenario: &BacktestScenario,
        seed: u64,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<BacktestResult>> {
        Ok(self
            .run_detailed(scenario, seed, cancel)?
            .into_iter()
            .map(|run| run.result)
            .collect())
    }

    /// Like [`Backtester::run`] over a caller-supplied path, such as
    /// replayed historical prices. The path length sets the duration.
    ///
    /// # Errors
    /// Same as [`Backtester::run`]; an empty path is an invalid scenario.
    pub fn run_with_path(
        &self,
        scenario: &BacktestScenario,
        path: &MarketPath,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<BacktestResult>> {
        Ok(self
            .run_detailed_with_path(scenario, path, cancel)?
            .into_iter()
            .map(|run| run.result)
            .collect())
    }

    /// Runs a seeded scenario and keeps equity curves and event logs.
    ///
    /// # Errors
    /// Same as [`Backtester::run`].
    pub fn run_detailed(
        &self,
        scenario: &BacktestScenario,
        seed: u64,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<StrategyRun>> {
        self.validate(scenario)?;
        let path = self.generate_path(scenario, seed)?;
        info!(
            strategies = scenario.strategies.len(),
            condition = %scenario.market_condition,
            steps = path.len(),
            seed,
            "Running backtest"
        );
        self.simulate(scenario, &path, cancel)
    }

    /// Detailed run over a caller-supplied path.
    ///
    /// # Errors
    /// Same as [`Backtester::run_with_path`].
    pub fn run_detailed_with_path(
        &self,
        scenario: &BacktestScenario,
        path: &MarketPath,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<StrategyRun>> {
        self.validate(scenario)?;
        if path.is_empty() {
            return Err(EngineError::invalid_scenario(
                "path",
                "market path must contain at least one step",
            ));
        }
        info!(
            strategies = scenario.strategies.len(),
            steps = path.len(),
            "Running backtest over supplied path"
        );
        self.simulate(scenario, path, cancel)
    }

    fn validate(&self, scenario: &BacktestScenario) -> EngineResult<()> {
        scenario.validate()?;
        self.config.validate()
    }

    fn simulate(
        &self,
        scenario: &BacktestScenario,
        path: &MarketPath,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<StrategyRun>> {
        let policy = self.config.policy.build(&self.config.compound);
        let capital = scenario.initial_capital.to_f64().unwrap_or(0.0);

        scenario
            .strategies
            .iter()
            .map(|strategy| self.simulate_strategy(strategy, capital, path, policy.as_ref(), cancel))
            .collect()
    }

    fn simulate_strategy(
        &self,
        strategy: &StrategySpec,
        initial_capital: f64,
        path: &MarketPath,
        policy: &dyn StepPolicy,
        cancel: &CancellationToken,
    ) -> EngineResult<StrategyRun> {
        let profile = self.config.profiles.for_risk(strategy.risk_level);
        let steps_per_year = f64::from(path.steps_per_day.max(1)) * crate::price_path::DAYS_PER_YEAR;
        let rate_per_step = strategy.expected_apy.to_f64().unwrap_or(0.0) / 100.0 / steps_per_year;
        let gas = self.config.gas_per_trade_usd().to_f64().unwrap_or(0.0);

        let mut state = PositionState::open(initial_capital, path.initial_price, profile.lp_share);
        let mut log = EventLog::new();
        let mut equity = Vec::with_capacity(path.len() + 1);
        equity.push(initial_capital);
        log.record(SimulationEvent::position_opened(0, path.initial_price, initial_capital));

        for (step, market) in path.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(strategy = %strategy.name, step, "Backtest cancelled");
                return Err(EngineError::Cancelled {
                    strategy: strategy.name.clone(),
                    step,
                });
            }

            state.apply_market(market.price_return, profile.market_beta);
            let yield_factor = (market.yield_factor + market.yield_shock * profile.yield_noise).max(0.0);
            state.accrue(rate_per_step * yield_factor);

            let context = StrategyContext {
                step,
                capital: state.capital,
                pending_rewards: state.pending_rewards,
                il_pct: state.il_pct(market.price),
                has_lp_exposure: state.has_lp_exposure(),
                steps_since_compound: state.steps_since_compound,
                steps_since_rebalance: state.steps_since_rebalance,
            };
            let decision = policy.evaluate(&context);

            if let Some(reason) = decision.rebalance {
                let realized = state.rebalance(market.price, gas);
                log.record(SimulationEvent::rebalance(
                    step,
                    market.price,
                    reason.to_string(),
                    realized,
                    gas,
                ));
            }
            if decision.compound {
                let amount = state.compound(gas);
                log.record(SimulationEvent::compound(step, market.price, amount, gas));
            }
            state.tick(decision.compound, decision.rebalance.is_some());

            equity.push(state.equity(market.price));
        }

        let final_price = path.final_price();
        let final_equity = state.equity(final_price);
        let net_return = state.gross_value(final_price) - initial_capital - state.gas_spent;
        log.record(SimulationEvent::position_closed(
            path.len(),
            final_price,
            final_equity,
            net_return,
        ));

        let returns = step_returns(&equity);
        let result = BacktestResult {
            strategy: strategy.name.clone(),
            net_return: to_decimal(net_return).round_dp(2),
            annualized_return: to_decimal(annualize_return(
                initial_capital,
                final_equity,
                path.days(),
            ))
            .round_dp(2),
            max_drawdown: to_decimal(max_drawdown_pct(&equity)).round_dp(2),
            sharpe_ratio: to_decimal(sharpe_ratio(
                &returns,
                self.config.risk_free_per_step(),
                steps_per_year,
            ))
            .round_dp(3),
            win_rate: to_decimal(win_rate_pct(&equity)).round_dp(2),
            total_trades: state.trades,
            gas_cost: to_decimal(state.gas_spent).round_dp(2),
        };

        debug!(
            strategy = %result.strategy,
            net_return = %result.net_return,
            trades = result.total_trades,
            max_drawdown = %result.max_drawdown,
            "Strategy simulated"
        );

        Ok(StrategyRun {
            result,
            equity_curve: equity,
            step_returns: returns,
            events: log.into_events(),
        })
    }
}
