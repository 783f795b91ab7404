//! Point-in-time capture of a wallet's positions.
//!
//! A snapshot is immutable once built: a refresh produces a new snapshot
//! rather than mutating positions in place.

use crate::entities::{LpPosition, Position, ProtocolInfo};
use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Positions and protocol metadata handed to the scorer and recommenders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub lp_positions: Vec<LpPosition>,
    /// Metadata for every protocol a position references.
    #[serde(default)]
    pub protocols: Vec<ProtocolInfo>,
}

impl Snapshot {
    /// Creates an empty snapshot over the given protocol metadata.
    #[must_use]
    pub fn new(protocols: Vec<ProtocolInfo>) -> Self {
        Self {
            positions: Vec::new(),
            lp_positions: Vec::new(),
            protocols,
        }
    }

    /// Adds a money-market position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Adds a liquidity-pool position.
    #[must_use]
    pub fn with_lp_position(mut self, position: LpPosition) -> Self {
        self.lp_positions.push(position);
        self
    }

    /// Looks up protocol metadata by name (case-insensitive).
    pub fn protocol(&self, name: &str) -> Option<&ProtocolInfo> {
        self.protocols
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn lending(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_lending())
    }

    pub fn borrowing(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_borrowing())
    }

    /// Total value supplied across lending positions.
    pub fn total_supplied(&self) -> Decimal {
        self.lending().map(|p| p.amount).sum()
    }

    /// Total value owed across borrowing positions.
    pub fn total_borrowed(&self) -> Decimal {
        self.borrowing().map(|p| p.amount).sum()
    }

    /// True when there is nothing to score.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.lp_positions.is_empty()
    }

    /// Checks amounts, health scores and protocol references.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidSnapshot`] naming the first offending
    /// field.
    pub fn validate(&self) -> EngineResult<()> {
        for (i, position) in self.positions.iter().enumerate() {
            if position.protocol.trim().is_empty() {
                return Err(EngineError::invalid_snapshot(
                    format!("positions[{i}].protocol"),
                    "protocol name is empty",
                ));
            }
            if position.amount < Decimal::ZERO {
                return Err(EngineError::invalid_snapshot(
                    format!("positions[{i}].amount"),
                    format!("amount must be non-negative, got {}", position.amount),
                ));
            }
            if position.health > 100 {
                return Err(EngineError::invalid_snapshot(
                    format!("positions[{i}].health"),
                    format!("health must be within 0..=100, got {}", position.health),
                ));
            }
            if self.protocol(&position.protocol).is_none() {
                return Err(EngineError::invalid_snapshot(
                    format!("positions[{i}].protocol"),
                    format!("unknown protocol '{}'", position.protocol),
                ));
            }
        }

        for (i, lp) in self.lp_positions.iter().enumerate() {
            if lp.liquidity < Decimal::ZERO {
                return Err(EngineError::invalid_snapshot(
                    format!("lpPositions[{i}].liquidity"),
                    format!("liquidity must be non-negative, got {}", lp.liquidity),
                ));
            }
            if lp.pending_rewards < Decimal::ZERO {
                return Err(EngineError::invalid_snapshot(
                    format!("lpPositions[{i}].pendingRewards"),
                    format!(
                        "pending rewards must be non-negative, got {}",
                        lp.pending_rewards
                    ),
                ));
            }
        }

        Ok(())
    }
}
