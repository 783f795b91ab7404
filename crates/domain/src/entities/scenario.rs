use crate::entities::StrategySpec;
use crate::enums::MarketCondition;
use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fully specifies one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestScenario {
    pub initial_capital: Decimal,
    pub duration_days: u32,
    pub strategies: Vec<StrategySpec>,
    #[serde(alias = "marketConditions")]
    pub market_condition: MarketCondition,
}

impl BacktestScenario {
    pub fn new(
        initial_capital: Decimal,
        duration_days: u32,
        market_condition: MarketCondition,
    ) -> Self {
        Self {
            initial_capital,
            duration_days,
            strategies: Vec::new(),
            market_condition,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategySpec) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Rejects scenarios that cannot be simulated.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidScenario`] naming the offending field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(EngineError::invalid_scenario(
                "initialCapital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if self.duration_days == 0 {
            return Err(EngineError::invalid_scenario(
                "durationDays",
                "must be at least one day",
            ));
        }
        if self.strategies.is_empty() {
            return Err(EngineError::invalid_scenario(
                "strategies",
                "at least one strategy is required",
            ));
        }

        let mut seen = HashSet::new();
        for (i, strategy) in self.strategies.iter().enumerate() {
            if strategy.name.trim().is_empty() {
                return Err(EngineError::invalid_scenario(
                    format!("strategies[{i}].name"),
                    "strategy name is empty",
                ));
            }
            if !seen.insert(strategy.name.as_str()) {
                return Err(EngineError::invalid_scenario(
                    format!("strategies[{i}].name"),
                    format!("duplicate strategy '{}'", strategy.name),
                ));
            }
            if strategy.expected_apy <= Decimal::NEGATIVE_ONE * Decimal::ONE_HUNDRED {
                return Err(EngineError::invalid_scenario(
                    format!("strategies[{i}].expectedApy"),
                    format!("must be above -100, got {}", strategy.expected_apy),
                ));
            }
        }

        Ok(())
    }
}
