use crate::entities::TokenPair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a liquidity position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundActionKind {
    Compound,
    Rebalance,
    Hold,
}

impl fmt::Display for CompoundActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompoundActionKind::Compound => "compound",
            CompoundActionKind::Rebalance => "rebalance",
            CompoundActionKind::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// Advisory action for one LP position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundAction {
    pub pair: TokenPair,
    pub action: CompoundActionKind,
    /// USD of rewards or liquidity affected.
    pub amount: Decimal,
    /// Current daily reward accrual in USD.
    pub expected_yield: Decimal,
    pub reason: String,
}
