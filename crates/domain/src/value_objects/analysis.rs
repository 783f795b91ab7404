use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Health factor reported when a portfolio carries no debt.
pub const HEALTH_FACTOR_SENTINEL: Decimal = Decimal::MAX;

/// Scored view of a snapshot. Derived on every evaluation, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    /// Weighted collateral over debt; below 1.0 means liquidation risk.
    pub health_factor: Decimal,
    /// Size-weighted average of quoted position APYs, in percent.
    pub total_apy: Decimal,
    /// Yield on net equity with borrowing costs subtracted, in percent.
    pub net_apy: Decimal,
    /// 1.0 (safest) to 5.0 (riskiest).
    pub risk_score: Decimal,
    pub collateral_value: Decimal,
    pub debt_value: Decimal,
    /// Money-market positions plus LP liquidity, in USD.
    pub total_value: Decimal,
    /// Net USD earned per day across all positions.
    pub daily_earnings: Decimal,
    pub active_positions: usize,
    /// Share of position value held in the largest single protocol, 0 to 1.
    pub concentration: Decimal,
}

impl PortfolioAnalysis {
    /// Analysis of a portfolio with nothing in it.
    pub fn neutral() -> Self {
        Self {
            health_factor: HEALTH_FACTOR_SENTINEL,
            total_apy: Decimal::ZERO,
            net_apy: Decimal::ZERO,
            risk_score: Decimal::ONE,
            collateral_value: Decimal::ZERO,
            debt_value: Decimal::ZERO,
            total_value: Decimal::ZERO,
            daily_earnings: Decimal::ZERO,
            active_positions: 0,
            concentration: Decimal::ZERO,
        }
    }

    /// True when the portfolio carries no debt.
    pub fn is_debt_free(&self) -> bool {
        self.health_factor == HEALTH_FACTOR_SENTINEL
    }

    /// True when the health factor sits below `threshold`.
    pub fn is_below(&self, threshold: Decimal) -> bool {
        !self.is_debt_free() && self.health_factor < threshold
    }
}
