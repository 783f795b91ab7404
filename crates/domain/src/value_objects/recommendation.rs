use crate::enums::RiskLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money-market action a rebalance may call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceActionKind {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

impl fmt::Display for RebalanceActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RebalanceActionKind::Deposit => "deposit",
            RebalanceActionKind::Withdraw => "withdraw",
            RebalanceActionKind::Borrow => "borrow",
            RebalanceActionKind::Repay => "repay",
        };
        f.write_str(s)
    }
}

/// Why a recommendation was raised. Health outranks yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Health,
    Yield,
}

/// One advisory money-market action. Regenerated on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRecommendation {
    pub action: RebalanceActionKind,
    pub protocol: String,
    pub token: String,
    pub amount: Decimal,
    /// APY of the position acted on, in percent.
    pub expected_apy: Decimal,
    /// Percentage points of APY gained (or cost avoided) by the action.
    pub expected_apy_gain: Decimal,
    /// USD gained over the amortization horizon.
    pub expected_gain_usd: Decimal,
    pub estimated_gas_usd: Decimal,
    pub risk_level: RiskLevel,
    pub urgency: Urgency,
    /// Health factor after this and every earlier health action is applied.
    pub projected_health_factor: Option<Decimal>,
    pub reason: String,
}
