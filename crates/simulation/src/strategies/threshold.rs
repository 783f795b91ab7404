//! Threshold policy: the LP recommender's rules applied step by step.

use super::{RebalanceReason, StepDecision, StepPolicy, StrategyContext};
use defi_engine_advisor::config::CompoundConfig;
use rust_decimal::prelude::ToPrimitive;

/// Compounds once rewards clear the gas-aware threshold and rebalances once
/// impermanent loss breaches the alarm level.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    /// Rewards must strictly exceed this, in USD.
    pub compound_threshold: f64,
    /// Absolute IL, in percent, that triggers a rebalance.
    pub il_alarm_pct: f64,
}

impl ThresholdPolicy {
    #[must_use]
    pub fn new(compound_threshold: f64, il_alarm_pct: f64) -> Self {
        Self {
            compound_threshold,
            il_alarm_pct,
        }
    }

    /// Mirrors [`CompoundConfig::should_compound`] and
    /// [`CompoundConfig::il_alarm`] in `f64`.
    #[must_use]
    pub fn from_config(config: &CompoundConfig) -> Self {
        Self::new(
            config.compound_threshold().to_f64().unwrap_or(f64::MAX),
            config.il_alarm_pct.to_f64().unwrap_or(f64::MAX),
        )
    }
}

impl StepPolicy for ThresholdPolicy {
    fn evaluate(&self, context: &StrategyContext) -> StepDecision {
        let rebalance = (context.has_lp_exposure && context.il_pct.abs() > self.il_alarm_pct)
            .then_some(RebalanceReason::ImpermanentLoss {
                il_pct: context.il_pct,
            });

        StepDecision {
            compound: context.pending_rewards > self.compound_threshold,
            rebalance,
        }
    }

    fn name(&self) -> &'static str {
        "Threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::context;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_default_config() {
        let policy = ThresholdPolicy::from_config(&CompoundConfig::default());
        assert_eq!(policy.compound_threshold, 4.0);
        assert_eq!(policy.il_alarm_pct, 5.0);
    }

    #[test]
    fn test_holds_below_thresholds() {
        let policy = ThresholdPolicy::new(4.0, 5.0);
        assert!(policy.evaluate(&context(4.0, -5.0)).is_hold());
    }

    #[test]
    fn test_compounds_above_threshold() {
        let policy = ThresholdPolicy::new(4.0, 5.0);
        let decision = policy.evaluate(&context(4.01, 0.0));
        assert!(decision.compound);
        assert!(decision.rebalance.is_none());
    }

    #[test]
    fn test_rebalances_on_impermanent_loss() {
        let policy = ThresholdPolicy::from_config(&CompoundConfig::default().with_il_alarm(dec!(3)));
        let decision = policy.evaluate(&context(0.0, -3.5));
        assert_eq!(
            decision.rebalance,
            Some(RebalanceReason::ImpermanentLoss { il_pct: -3.5 })
        );
    }

    #[test]
    fn test_no_rebalance_without_lp_exposure() {
        let policy = ThresholdPolicy::new(4.0, 5.0);
        let mut ctx = context(0.0, -9.0);
        ctx.has_lp_exposure = false;
        assert!(policy.evaluate(&ctx).is_hold());
    }
}
