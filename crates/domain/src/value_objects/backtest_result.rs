use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Performance of one strategy over one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy: String,
    /// Final capital minus initial capital minus gas, in USD.
    pub net_return: Decimal,
    /// Percent, compounded to a 365-day basis.
    pub annualized_return: Decimal,
    /// Largest peak-to-trough decline, percent of the peak.
    pub max_drawdown: Decimal,
    pub sharpe_ratio: Decimal,
    /// Percent of steps with a non-negative return.
    pub win_rate: Decimal,
    pub total_trades: u32,
    pub gas_cost: Decimal,
}
