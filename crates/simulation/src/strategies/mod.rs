//! Per-step trade policies replayed by the backtester.
//!
//! A policy looks at the simulated position after each step and decides
//! whether to compound pending rewards and whether to re-centre LP exposure.

pub mod periodic;
pub mod threshold;

pub use periodic::PeriodicPolicy;
pub use threshold::ThresholdPolicy;

use defi_engine_advisor::config::CompoundConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated position state handed to a policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyContext {
    pub step: usize,
    /// Deployed capital in USD.
    pub capital: f64,
    /// Unclaimed rewards in USD.
    pub pending_rewards: f64,
    /// Impermanent loss since the last rebalance, in signed percent.
    pub il_pct: f64,
    /// Whether part of the capital sits in a liquidity pool.
    pub has_lp_exposure: bool,
    pub steps_since_compound: usize,
    pub steps_since_rebalance: usize,
}

/// Why a rebalance fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RebalanceReason {
    ImpermanentLoss { il_pct: f64 },
    Periodic { steps_elapsed: usize },
}

impl fmt::Display for RebalanceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceReason::ImpermanentLoss { il_pct } => {
                write!(f, "Impermanent loss reached {:.2}%", il_pct.abs())
            }
            RebalanceReason::Periodic { steps_elapsed } => {
                write!(f, "Periodic rebalance after {steps_elapsed} steps")
            }
        }
    }
}

/// What a policy wants done at the end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepDecision {
    pub compound: bool,
    pub rebalance: Option<RebalanceReason>,
}

impl StepDecision {
    #[must_use]
    pub fn hold() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_hold(&self) -> bool {
        !self.compound && self.rebalance.is_none()
    }
}

/// Trait for per-step trade policies.
pub trait StepPolicy {
    /// Decides what to do given the state at the end of a step.
    fn evaluate(&self, context: &StrategyContext) -> StepDecision;

    fn name(&self) -> &'static str;
}

/// Serializable choice of policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PolicyKind {
    /// Compound and IL rules of the LP recommender.
    #[default]
    Threshold,
    /// Fixed schedule.
    Periodic {
        compound_every_steps: usize,
        rebalance_every_steps: usize,
    },
}

impl PolicyKind {
    /// Instantiates the policy.
    #[must_use]
    pub fn build(&self, compound: &CompoundConfig) -> Box<dyn StepPolicy + Send + Sync> {
        match self {
            PolicyKind::Threshold => Box::new(ThresholdPolicy::from_config(compound)),
            PolicyKind::Periodic {
                compound_every_steps,
                rebalance_every_steps,
            } => Box::new(PeriodicPolicy::new(
                *compound_every_steps,
                *rebalance_every_steps,
            )),
        }
    }
}

#[cfg(test)]
pub(crate) fn context(pending_rewards: f64, il_pct: f64) -> StrategyContext {
    StrategyContext {
        step: 10,
        capital: 10_000.0,
        pending_rewards,
        il_pct,
        has_lp_exposure: true,
        steps_since_compound: 10,
        steps_since_rebalance: 10,
    }
}
