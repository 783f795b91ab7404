use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token pair of a liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token0: String,
    pub token1: String,
}

impl TokenPair {
    pub fn new(token0: impl Into<String>, token1: impl Into<String>) -> Self {
        Self {
            token0: token0.into(),
            token1: token1.into(),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

/// One liquidity-pool stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpPosition {
    pub pair: TokenPair,
    /// USD value of the liquidity provided.
    pub liquidity: Decimal,
    /// Annualized reward yield in percent.
    pub apy: Decimal,
    /// Unclaimed rewards in USD.
    pub pending_rewards: Decimal,
    /// Signed percent, negative for a loss versus holding.
    pub impermanent_loss: Decimal,
}

impl LpPosition {
    pub fn new(pair: TokenPair, liquidity: Decimal, apy: Decimal) -> Self {
        Self {
            pair,
            liquidity,
            apy,
            pending_rewards: Decimal::ZERO,
            impermanent_loss: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_pending_rewards(mut self, rewards: Decimal) -> Self {
        self.pending_rewards = rewards;
        self
    }

    #[must_use]
    pub fn with_impermanent_loss(mut self, il_pct: Decimal) -> Self {
        self.impermanent_loss = il_pct;
        self
    }

    /// Rewards accrued per day at the current APY, in USD.
    pub fn daily_accrual(&self) -> Decimal {
        crate::metrics::apy::daily_yield(self.liquidity, self.apy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_daily_accrual() {
        let lp = LpPosition::new(TokenPair::new("ETH", "USDC"), dec!(36500), dec!(10));
        assert_eq!(lp.daily_accrual(), dec!(10));
        assert_eq!(lp.pair.to_string(), "ETH/USDC");
    }
}
