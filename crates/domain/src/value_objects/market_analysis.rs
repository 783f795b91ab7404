use crate::enums::MarketCondition;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Regime classification of a price path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub condition: MarketCondition,
    /// 0 to 100.
    pub confidence: Decimal,
    pub trends: Vec<String>,
}
