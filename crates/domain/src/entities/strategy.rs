use crate::enums::RiskLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named strategy as listed in the strategy catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySpec {
    pub name: String,
    pub risk_level: RiskLevel,
    /// Expected annual yield in percent.
    pub expected_apy: Decimal,
    #[serde(default)]
    pub description: String,
}

impl StrategySpec {
    pub fn new(name: impl Into<String>, risk_level: RiskLevel, expected_apy: Decimal) -> Self {
        Self {
            name: name.into(),
            risk_level,
            expected_apy,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Strategies offered when no external catalog is configured.
    pub fn default_catalog() -> Vec<StrategySpec> {
        vec![
            Self::new("Conservative Lending", RiskLevel::Low, Decimal::new(12, 0))
                .with_description("Supply stablecoins to blue-chip lending markets"),
            Self::new("Balanced LP", RiskLevel::Medium, Decimal::new(185, 1))
                .with_description("Provide liquidity to correlated pairs with auto-compounding"),
            Self::new("Leveraged Lending Loop", RiskLevel::Medium, Decimal::new(22, 0))
                .with_description("Recursive supply and borrow on a single lending market"),
            Self::new("Aggressive Yield Farming", RiskLevel::High, Decimal::new(321, 1))
                .with_description("Volatile-pair liquidity mining with frequent compounding"),
        ]
    }
}
