use defi_engine_domain::EngineError;
use defi_engine_domain::value_objects::BacktestResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Scores a backtest result; higher is better.
pub trait ObjectiveFunction {
    fn evaluate(&self, result: &BacktestResult) -> Decimal;

    fn compare(&self, a: &BacktestResult, b: &BacktestResult) -> Ordering {
        self.evaluate(a).cmp(&self.evaluate(b))
    }

    fn name(&self) -> &'static str;
}

pub struct MaximizeNetReturn;
impl ObjectiveFunction for MaximizeNetReturn {
    fn evaluate(&self, result: &BacktestResult) -> Decimal {
        result.net_return
    }

    fn name(&self) -> &'static str {
        "net return"
    }
}

pub struct MaximizeSharpeRatio;
impl ObjectiveFunction for MaximizeSharpeRatio {
    fn evaluate(&self, result: &BacktestResult) -> Decimal {
        result.sharpe_ratio
    }

    fn name(&self) -> &'static str {
        "Sharpe ratio"
    }
}

pub struct MinimizeDrawdown;
impl ObjectiveFunction for MinimizeDrawdown {
    fn evaluate(&self, result: &BacktestResult) -> Decimal {
        -result.max_drawdown
    }

    fn name(&self) -> &'static str {
        "max drawdown"
    }
}

/// Serializable selector over the built-in objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    #[default]
    NetReturn,
    Sharpe,
    Drawdown,
}

impl Objective {
    #[must_use]
    pub fn function(&self) -> &'static dyn ObjectiveFunction {
        match self {
            Objective::NetReturn => &MaximizeNetReturn,
            Objective::Sharpe => &MaximizeSharpeRatio,
            Objective::Drawdown => &MinimizeDrawdown,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Objective::NetReturn => "net-return",
            Objective::Sharpe => "sharpe",
            Objective::Drawdown => "drawdown",
        };
        f.write_str(s)
    }
}

impl FromStr for Objective {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "net-return" | "return" => Ok(Objective::NetReturn),
            "sharpe" => Ok(Objective::Sharpe),
            "drawdown" => Ok(Objective::Drawdown),
            other => Err(EngineError::invalid_config(
                "objective",
                format!("unknown objective '{other}'"),
            )),
        }
    }
}

/// Sorts results best-first. Ties keep their input order.
#[must_use]
pub fn rank_results(
    mut results: Vec<BacktestResult>,
    objective: &dyn ObjectiveFunction,
) -> Vec<BacktestResult> {
    results.sort_by(|a, b| objective.compare(b, a));
    if let Some(best) = results.first() {
        debug!(
            objective = objective.name(),
            best = %best.strategy,
            score = %objective.evaluate(best),
            "Ranked backtest results"
        );
    }
    results
}
