//! Gas cost versus expected gain.
//!
//! A move is only worth making when its fees stay under a fraction of the
//! yield it is expected to earn over an amortization horizon.

use crate::config::positive;
use defi_engine_domain::EngineResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee policy applied to every recommended money-market action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GasPolicy {
    /// Estimated fee of a single on-chain action, in USD.
    pub gas_cost_per_action_usd: Decimal,
    /// Largest share of the expected gain fees may consume.
    pub max_gas_fraction: Decimal,
    /// Days of yield counted towards the expected gain.
    pub amortization_days: u32,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            gas_cost_per_action_usd: Decimal::new(5, 0),
            max_gas_fraction: Decimal::new(5, 1), // 50%
            amortization_days: 30,
        }
    }
}

impl GasPolicy {
    #[must_use]
    pub fn with_gas_cost(mut self, usd: Decimal) -> Self {
        self.gas_cost_per_action_usd = usd;
        self
    }

    #[must_use]
    pub fn with_max_gas_fraction(mut self, fraction: Decimal) -> Self {
        self.max_gas_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_amortization_days(mut self, days: u32) -> Self {
        self.amortization_days = days;
        self
    }

    /// Compares the fees of `actions` on-chain actions against `expected_gain`.
    pub fn check(&self, actions: u32, expected_gain: Decimal) -> ProfitabilityCheck {
        let estimated_gas = self.gas_cost_per_action_usd * Decimal::from(actions);
        let max_allowed_gas = expected_gain * self.max_gas_fraction;

        ProfitabilityCheck {
            is_profitable: expected_gain > Decimal::ZERO && estimated_gas <= max_allowed_gas,
            estimated_gas,
            expected_gain,
            max_allowed_gas,
        }
    }

    pub(crate) fn validate(&self, prefix: &str) -> EngineResult<()> {
        if self.gas_cost_per_action_usd < Decimal::ZERO {
            return Err(defi_engine_domain::EngineError::invalid_config(
                format!("{prefix}.gasCostPerActionUsd"),
                "must be non-negative",
            ));
        }
        positive(self.max_gas_fraction, &format!("{prefix}.maxGasFraction"))?;
        if self.amortization_days == 0 {
            return Err(defi_engine_domain::EngineError::invalid_config(
                format!("{prefix}.amortizationDays"),
                "must be at least one day",
            ));
        }
        Ok(())
    }
}

/// Result of a gas profitability check.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitabilityCheck {
    pub is_profitable: bool,
    pub estimated_gas: Decimal,
    pub expected_gain: Decimal,
    pub max_allowed_gas: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gas_policy_default() {
        let policy = GasPolicy::default();
        assert_eq!(policy.gas_cost_per_action_usd, dec!(5));
        assert_eq!(policy.amortization_days, 30);
    }

    #[test]
    fn test_rejects_fees_above_fraction() {
        let policy = GasPolicy::default();

        // Two actions cost $10, half of a $15 gain is $7.50.
        let check = policy.check(2, dec!(15));
        assert!(!check.is_profitable);
        assert_eq!(check.estimated_gas, dec!(10));
        assert_eq!(check.max_allowed_gas, dec!(7.5));

        assert!(policy.check(2, dec!(20)).is_profitable);
    }

    #[test]
    fn test_zero_gain_is_never_profitable() {
        let policy = GasPolicy::default().with_gas_cost(Decimal::ZERO);
        assert!(!policy.check(1, Decimal::ZERO).is_profitable);
    }
}
