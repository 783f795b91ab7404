use crate::enums::{ProtocolCategory, RiskLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Yield and risk metadata for a protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolInfo {
    pub name: String,
    /// Headline supply APY in percent.
    pub apy: Decimal,
    pub tvl_usd: Decimal,
    pub risk: RiskLevel,
    pub category: ProtocolCategory,
}

impl ProtocolInfo {
    pub fn new(
        name: impl Into<String>,
        apy: Decimal,
        tvl_usd: Decimal,
        risk: RiskLevel,
        category: ProtocolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            apy,
            tvl_usd,
            risk,
            category,
        }
    }

    /// Protocols tracked on Base out of the box.
    pub fn base_catalog() -> Vec<ProtocolInfo> {
        vec![
            Self::new(
                "Aave",
                Decimal::new(125, 1),
                Decimal::new(2_400_000_000, 0),
                RiskLevel::Low,
                ProtocolCategory::Lending,
            ),
            Self::new(
                "Aerodrome",
                Decimal::new(248, 1),
                Decimal::new(890_000_000, 0),
                RiskLevel::Medium,
                ProtocolCategory::Dex,
            ),
            Self::new(
                "Moonwell",
                Decimal::new(152, 1),
                Decimal::new(450_000_000, 0),
                RiskLevel::Low,
                ProtocolCategory::Lending,
            ),
            Self::new(
                "BaseSwap",
                Decimal::new(321, 1),
                Decimal::new(120_000_000, 0),
                RiskLevel::High,
                ProtocolCategory::Dex,
            ),
            Self::new(
                "Seamless",
                Decimal::new(187, 1),
                Decimal::new(340_000_000, 0),
                RiskLevel::Medium,
                ProtocolCategory::Lending,
            ),
        ]
    }
}
