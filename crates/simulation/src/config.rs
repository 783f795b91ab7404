//! Backtest configuration.

use crate::strategies::PolicyKind;
use defi_engine_advisor::config::CompoundConfig;
use defi_engine_domain::enums::RiskLevel;
use defi_engine_domain::{EngineError, EngineResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// How a strategy of a given risk tier is exposed to the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProfile {
    /// Sensitivity of deployed capital to the path's price return.
    pub market_beta: f64,
    /// Fraction of capital held as LP liquidity, exposed to impermanent loss.
    pub lp_share: f64,
    /// Scale of the per-step yield shock around the expected APY.
    pub yield_noise: f64,
}

/// One [`TierProfile`] per risk tier. Higher tiers carry more variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskProfiles {
    pub low: TierProfile,
    pub medium: TierProfile,
    pub high: TierProfile,
}

impl Default for RiskProfiles {
    fn default() -> Self {
        Self {
            low: TierProfile {
                market_beta: 0.05,
                lp_share: 0.0,
                yield_noise: 0.1,
            },
            medium: TierProfile {
                market_beta: 0.3,
                lp_share: 0.5,
                yield_noise: 0.35,
            },
            high: TierProfile {
                market_beta: 0.6,
                lp_share: 1.0,
                yield_noise: 0.7,
            },
        }
    }
}

impl RiskProfiles {
    #[must_use]
    pub fn for_risk(&self, risk: RiskLevel) -> TierProfile {
        match risk {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        for (name, profile) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if !(0.0..=3.0).contains(&profile.market_beta) {
                return Err(EngineError::invalid_config(
                    format!("backtest.profiles.{name}.marketBeta"),
                    "must be within [0, 3]",
                ));
            }
            if !(0.0..=1.0).contains(&profile.lp_share) {
                return Err(EngineError::invalid_config(
                    format!("backtest.profiles.{name}.lpShare"),
                    "must be within [0, 1]",
                ));
            }
            if !(profile.yield_noise >= 0.0 && profile.yield_noise.is_finite()) {
                return Err(EngineError::invalid_config(
                    format!("backtest.profiles.{name}.yieldNoise"),
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }
}

/// Ten years of hourly steps.
pub const DEFAULT_MAX_STEPS: u64 = 10 * 365 * 24;

/// Configuration for [`Backtester`](crate::backtester::Backtester).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BacktestConfig {
    /// Simulated steps per day.
    pub steps_per_day: u32,
    /// Longest path a scenario may request, in steps.
    pub max_steps: u64,
    /// Opening price of synthetic paths.
    pub initial_price: Decimal,
    /// Annual risk-free rate in percent, used by the Sharpe ratio.
    pub risk_free_rate_pct: Decimal,
    /// Compound and IL thresholds shared with the LP recommender. Its
    /// `gasCostUsd` is also the fee charged for every simulated trade.
    pub compound: CompoundConfig,
    pub policy: PolicyKind,
    pub profiles: RiskProfiles,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 1,
            max_steps: DEFAULT_MAX_STEPS,
            initial_price: Decimal::ONE_HUNDRED,
            risk_free_rate_pct: Decimal::new(4, 0),
            compound: CompoundConfig::default(),
            policy: PolicyKind::default(),
            profiles: RiskProfiles::default(),
        }
    }
}

impl BacktestConfig {
    #[must_use]
    pub fn with_steps_per_day(mut self, steps: u32) -> Self {
        self.steps_per_day = steps;
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    #[must_use]
    pub fn with_initial_price(mut self, price: Decimal) -> Self {
        self.initial_price = price;
        self
    }

    #[must_use]
    pub fn with_risk_free_rate(mut self, pct: Decimal) -> Self {
        self.risk_free_rate_pct = pct;
        self
    }

    #[must_use]
    pub fn with_gas_per_trade(mut self, usd: Decimal) -> Self {
        self.compound.gas_cost_usd = usd;
        self
    }

    #[must_use]
    pub fn with_compound(mut self, compound: CompoundConfig) -> Self {
        self.compound = compound;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_profiles(mut self, profiles: RiskProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Fee of one simulated compound or rebalance, in USD.
    #[must_use]
    pub fn gas_per_trade_usd(&self) -> Decimal {
        self.compound.gas_cost_usd
    }

    /// Steps in a simulated 365-day year.
    #[must_use]
    pub fn steps_per_year(&self) -> f64 {
        crate::price_path::DAYS_PER_YEAR * f64::from(self.steps_per_day.max(1))
    }

    /// Number of steps `duration_days` spans.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidScenario`] on `durationDays` when the
    /// path would exceed `max_steps`.
    pub fn path_steps(&self, duration_days: u32) -> EngineResult<usize> {
        let steps = u64::from(duration_days) * u64::from(self.steps_per_day);
        if steps > self.max_steps {
            return Err(EngineError::invalid_scenario(
                "durationDays",
                format!(
                    "{duration_days} days at {} steps per day exceeds the {} step limit",
                    self.steps_per_day, self.max_steps
                ),
            ));
        }
        usize::try_from(steps).map_err(|_| {
            EngineError::invalid_scenario("durationDays", "path does not fit in memory")
        })
    }

    /// Risk-free return per step, as a fraction.
    #[must_use]
    pub fn risk_free_per_step(&self) -> f64 {
        self.risk_free_rate_pct.to_f64().unwrap_or(0.0) / 100.0 / self.steps_per_year()
    }

    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] for out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.steps_per_day == 0 {
            return Err(EngineError::invalid_config(
                "backtest.stepsPerDay",
                "must be at least 1",
            ));
        }
        if self.max_steps == 0 {
            return Err(EngineError::invalid_config(
                "backtest.maxSteps",
                "must be at least 1",
            ));
        }
        if self.initial_price <= Decimal::ZERO {
            return Err(EngineError::invalid_config(
                "backtest.initialPrice",
                "must be positive",
            ));
        }
        if self.risk_free_rate_pct <= -Decimal::ONE_HUNDRED {
            return Err(EngineError::invalid_config(
                "backtest.riskFreeRatePct",
                "must be above -100",
            ));
        }
        if matches!(
            self.policy,
            PolicyKind::Periodic {
                compound_every_steps,
                rebalance_every_steps,
            } if compound_every_steps == 0 || rebalance_every_steps == 0
        ) {
            return Err(EngineError::invalid_config(
                "backtest.policy",
                "periodic intervals must be at least 1 step",
            ));
        }
        self.compound.validate()?;
        self.profiles.validate()
    }
}
