use crate::enums::PositionKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One open exposure to a money-market protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub protocol: String,
    pub kind: PositionKind,
    pub token: String,
    /// USD value of the position.
    pub amount: Decimal,
    /// Annualized yield in percent. Borrowing costs may be quoted negative.
    pub apy: Decimal,
    /// Integrity score reported by the protocol, 0 to 100.
    pub health: u8,
}

impl Position {
    pub fn new(
        protocol: impl Into<String>,
        kind: PositionKind,
        token: impl Into<String>,
        amount: Decimal,
        apy: Decimal,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            kind,
            token: token.into(),
            amount,
            apy,
            health: 100,
        }
    }

    /// Shorthand for a lending position.
    pub fn lending(
        protocol: impl Into<String>,
        token: impl Into<String>,
        amount: Decimal,
        apy: Decimal,
    ) -> Self {
        Self::new(protocol, PositionKind::Lending, token, amount, apy)
    }

    /// Shorthand for a borrowing position.
    pub fn borrowing(
        protocol: impl Into<String>,
        token: impl Into<String>,
        amount: Decimal,
        apy: Decimal,
    ) -> Self {
        Self::new(protocol, PositionKind::Borrowing, token, amount, apy)
    }

    #[must_use]
    pub fn with_health(mut self, health: u8) -> Self {
        self.health = health;
        self
    }

    pub fn is_lending(&self) -> bool {
        self.kind == PositionKind::Lending
    }

    pub fn is_borrowing(&self) -> bool {
        self.kind == PositionKind::Borrowing
    }

    /// Yearly interest cost of a borrowing position in USD, regardless of
    /// the sign the APY was quoted with.
    pub fn yearly_cost(&self) -> Decimal {
        self.amount * self.apy.abs() / Decimal::ONE_HUNDRED
    }
}
