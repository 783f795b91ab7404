//! Scoring and recommendation policies.
//!
//! Defaults mirror the dashboard's settings panel: a minimum health factor of
//! 1.5 and a 5 point APY rebalance threshold.

use crate::gas::GasPolicy;
use defi_engine_domain::enums::RiskLevel;
use defi_engine_domain::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of supplied value that counts as collateral, per protocol risk tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollateralFactors {
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
}

impl Default for CollateralFactors {
    fn default() -> Self {
        Self {
            low: Decimal::new(85, 2),
            medium: Decimal::new(80, 2),
            high: Decimal::new(70, 2),
        }
    }
}

impl CollateralFactors {
    /// Liquidation threshold for a risk tier.
    #[must_use]
    pub fn factor(&self, risk: RiskLevel) -> Decimal {
        match risk {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    fn validate(&self, prefix: &str) -> EngineResult<()> {
        for (name, value) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(EngineError::invalid_config(
                    format!("{prefix}.{name}"),
                    format!("must be within (0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// How the health factor is computed and judged. Scoring and rebalancing
/// must agree on it, otherwise advice contradicts the analysis it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthPolicy {
    /// Minimum acceptable health factor.
    pub safety_health_factor: Decimal,
    pub collateral: CollateralFactors,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            safety_health_factor: Decimal::new(15, 1),
            collateral: CollateralFactors::default(),
        }
    }
}

impl HealthPolicy {
    #[must_use]
    pub fn with_safety_health_factor(mut self, value: Decimal) -> Self {
        self.safety_health_factor = value;
        self
    }

    #[must_use]
    pub fn with_collateral(mut self, collateral: CollateralFactors) -> Self {
        self.collateral = collateral;
        self
    }

    fn validate(&self, prefix: &str) -> EngineResult<()> {
        positive(
            self.safety_health_factor,
            &format!("{prefix}.safetyHealthFactor"),
        )?;
        self.collateral.validate(&format!("{prefix}.collateral"))
    }
}

/// Configuration for the health and risk scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Health factor under which risk starts to climb.
    pub health: HealthPolicy,
    /// Risk points per tier above `Low`, value weighted.
    pub tier_weight: Decimal,
    /// Risk points for a fully concentrated portfolio.
    pub concentration_weight: Decimal,
    /// Risk points for a health factor of zero.
    pub health_weight: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            health: HealthPolicy::default(),
            tier_weight: Decimal::ONE,
            concentration_weight: Decimal::ONE,
            health_weight: Decimal::TWO,
        }
    }
}

impl ScoringConfig {
    #[must_use]
    pub fn with_health(mut self, health: HealthPolicy) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, tier: Decimal, concentration: Decimal, health: Decimal) -> Self {
        self.tier_weight = tier;
        self.concentration_weight = concentration;
        self.health_weight = health;
        self
    }

    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] for out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        self.health.validate("scoring.health")?;
        for (name, value) in [
            ("tierWeight", self.tier_weight),
            ("concentrationWeight", self.concentration_weight),
            ("healthWeight", self.health_weight),
        ] {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_config(
                    format!("scoring.{name}"),
                    "must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration for the rebalance recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RebalanceConfig {
    /// Must match the policy the analysis was scored with.
    pub health: HealthPolicy,
    /// Headroom added on top of the safety factor when restoring health.
    pub safety_margin: Decimal,
    /// APY gap, in percentage points, that justifies moving capital.
    pub apy_spread_threshold: Decimal,
    /// Largest share of supplied capital a single move may shift.
    pub max_move_fraction: Decimal,
    /// Riskiest protocol tier capital may be moved into.
    pub max_risk_level: RiskLevel,
    pub gas: GasPolicy,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            health: HealthPolicy::default(),
            safety_margin: Decimal::new(2, 1),
            apy_spread_threshold: Decimal::new(5, 0),
            max_move_fraction: Decimal::new(25, 2),
            max_risk_level: RiskLevel::Medium,
            gas: GasPolicy::default(),
        }
    }
}

impl RebalanceConfig {
    #[must_use]
    pub fn with_health(mut self, health: HealthPolicy) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub fn with_safety_margin(mut self, value: Decimal) -> Self {
        self.safety_margin = value;
        self
    }

    #[must_use]
    pub fn with_apy_spread_threshold(mut self, value: Decimal) -> Self {
        self.apy_spread_threshold = value;
        self
    }

    #[must_use]
    pub fn with_max_move_fraction(mut self, value: Decimal) -> Self {
        self.max_move_fraction = value;
        self
    }

    #[must_use]
    pub fn with_max_risk_level(mut self, value: RiskLevel) -> Self {
        self.max_risk_level = value;
        self
    }

    #[must_use]
    pub fn with_gas(mut self, gas: GasPolicy) -> Self {
        self.gas = gas;
        self
    }

    /// Health factor a restoring repayment aims for.
    #[must_use]
    pub fn target_health_factor(&self) -> Decimal {
        self.health.safety_health_factor + self.safety_margin
    }

    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] for out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        self.health.validate("rebalance.health")?;
        if self.safety_margin < Decimal::ZERO {
            return Err(EngineError::invalid_config(
                "rebalance.safetyMargin",
                "must be non-negative",
            ));
        }
        if self.apy_spread_threshold < Decimal::ZERO {
            return Err(EngineError::invalid_config(
                "rebalance.apySpreadThreshold",
                "must be non-negative",
            ));
        }
        positive(self.max_move_fraction, "rebalance.maxMoveFraction")?;
        if self.max_move_fraction > Decimal::ONE {
            return Err(EngineError::invalid_config(
                "rebalance.maxMoveFraction",
                "must not exceed 1",
            ));
        }
        self.gas.validate("rebalance.gas")
    }
}

/// Configuration for the LP compound recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundConfig {
    /// Estimated fee of one claim-and-restake, in USD.
    pub gas_cost_usd: Decimal,
    /// Rewards must exceed the fee by this multiple.
    pub gas_safety_factor: Decimal,
    /// Floor below which rewards are never worth claiming, in USD.
    pub min_compound_usd: Decimal,
    /// Absolute impermanent loss, in percent, that triggers a rebalance.
    pub il_alarm_pct: Decimal,
}

impl Default for CompoundConfig {
    fn default() -> Self {
        Self {
            gas_cost_usd: Decimal::TWO,
            gas_safety_factor: Decimal::TWO,
            min_compound_usd: Decimal::ONE,
            il_alarm_pct: Decimal::new(5, 0),
        }
    }
}

impl CompoundConfig {
    #[must_use]
    pub fn with_gas_cost(mut self, usd: Decimal) -> Self {
        self.gas_cost_usd = usd;
        self
    }

    #[must_use]
    pub fn with_gas_safety_factor(mut self, factor: Decimal) -> Self {
        self.gas_safety_factor = factor;
        self
    }

    #[must_use]
    pub fn with_min_compound(mut self, usd: Decimal) -> Self {
        self.min_compound_usd = usd;
        self
    }

    #[must_use]
    pub fn with_il_alarm(mut self, pct: Decimal) -> Self {
        self.il_alarm_pct = pct;
        self
    }

    /// Smallest reward balance worth compounding.
    #[must_use]
    pub fn compound_threshold(&self) -> Decimal {
        (self.gas_cost_usd * self.gas_safety_factor).max(self.min_compound_usd)
    }

    #[must_use]
    pub fn should_compound(&self, pending_rewards: Decimal) -> bool {
        pending_rewards > self.compound_threshold()
    }

    #[must_use]
    pub fn il_alarm(&self, impermanent_loss_pct: Decimal) -> bool {
        impermanent_loss_pct.abs() > self.il_alarm_pct
    }

    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] for out-of-range values.
    pub fn validate(&self) -> EngineResult<()> {
        for (name, value) in [
            ("gasCostUsd", self.gas_cost_usd),
            ("minCompoundUsd", self.min_compound_usd),
        ] {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_config(
                    format!("compound.{name}"),
                    "must be non-negative",
                ));
            }
        }
        if self.gas_safety_factor < Decimal::ONE {
            return Err(EngineError::invalid_config(
                "compound.gasSafetyFactor",
                "must be at least 1",
            ));
        }
        positive(self.il_alarm_pct, "compound.ilAlarmPct")
    }
}

pub(crate) fn positive(value: Decimal, field: &str) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_config(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}
