//! Periodic policy.
//!
//! Compounds and rebalances on a fixed schedule, regardless of reward size
//! or price movement.

use super::{RebalanceReason, StepDecision, StepPolicy, StrategyContext};

/// Compounds every `compound_interval` steps and re-centres LP exposure
/// every `rebalance_interval` steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicPolicy {
    pub compound_interval: usize,
    pub rebalance_interval: usize,
}

impl PeriodicPolicy {
    /// Intervals below one step are treated as one.
    #[must_use]
    pub fn new(compound_interval: usize, rebalance_interval: usize) -> Self {
        Self {
            compound_interval: compound_interval.max(1),
            rebalance_interval: rebalance_interval.max(1),
        }
    }
}

impl StepPolicy for PeriodicPolicy {
    fn evaluate(&self, context: &StrategyContext) -> StepDecision {
        let compound = context.pending_rewards > 0.0
            && context.steps_since_compound + 1 >= self.compound_interval;

        let rebalance = (context.has_lp_exposure
            && context.il_pct != 0.0
            && context.steps_since_rebalance + 1 >= self.rebalance_interval)
            .then_some(RebalanceReason::Periodic {
                steps_elapsed: context.steps_since_rebalance + 1,
            });

        StepDecision {
            compound,
            rebalance,
        }
    }

    fn name(&self) -> &'static str {
        "Periodic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::context;

    #[test]
    fn test_periodic_holds_before_interval() {
        let policy = PeriodicPolicy::new(30, 30);
        assert!(policy.evaluate(&context(100.0, -8.0)).is_hold());
    }

    #[test]
    fn test_periodic_fires_at_interval() {
        let policy = PeriodicPolicy::new(11, 11);
        let decision = policy.evaluate(&context(0.5, -0.1));
        assert!(decision.compound);
        assert_eq!(
            decision.rebalance,
            Some(RebalanceReason::Periodic { steps_elapsed: 11 })
        );
    }

    #[test]
    fn test_nothing_to_compound() {
        let policy = PeriodicPolicy::new(1, 1);
        let decision = policy.evaluate(&context(0.0, 0.0));
        assert!(decision.is_hold());
    }

    #[test]
    fn test_zero_interval_is_every_step() {
        let policy = PeriodicPolicy::new(0, 0);
        assert_eq!(policy.compound_interval, 1);
        assert_eq!(policy.rebalance_interval, 1);
    }
}
