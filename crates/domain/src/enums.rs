use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a money-market position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    Lending,
    Borrowing,
}

/// Protocol or strategy risk tier.
///
/// Ordered from safest to riskiest so tiers can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Numeric tier, 1 for `Low` through 3 for `High`.
    #[must_use]
    pub fn tier(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    /// Tier as a decimal, convenient for weighted averages.
    #[must_use]
    pub fn tier_decimal(&self) -> Decimal {
        Decimal::from(self.tier())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// Market regime driving synthetic backtest paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCondition {
    Bull,
    Bear,
    Sideways,
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketCondition::Bull => "bull",
            MarketCondition::Bear => "bear",
            MarketCondition::Sideways => "sideways",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for MarketCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bull" => Ok(MarketCondition::Bull),
            "bear" => Ok(MarketCondition::Bear),
            "sideways" => Ok(MarketCondition::Sideways),
            other => Err(format!("unknown market condition: {other}")),
        }
    }
}

/// What a protocol primarily does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolCategory {
    Lending,
    #[serde(rename = "DEX")]
    Dex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.tier(), 3);
    }

    #[test]
    fn test_market_condition_serde_is_lowercase() {
        let json = serde_json::to_string(&MarketCondition::Sideways).unwrap();
        assert_eq!(json, "\"sideways\"");
        let parsed: MarketCondition = serde_json::from_str("\"bull\"").unwrap();
        assert_eq!(parsed, MarketCondition::Bull);
        assert_eq!("Bear".parse::<MarketCondition>().unwrap(), MarketCondition::Bear);
    }
}
