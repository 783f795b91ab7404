//! Health and risk scoring.
//!
//! The scorer is a pure function of a snapshot and is cheap enough to run on
//! every refresh.

use crate::config::{CollateralFactors, ScoringConfig};
use defi_engine_domain::EngineResult;
use defi_engine_domain::entities::Snapshot;
use defi_engine_domain::enums::RiskLevel;
use defi_engine_domain::metrics::daily_yield;
use defi_engine_domain::value_objects::{HEALTH_FACTOR_SENTINEL, PortfolioAnalysis};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

const MIN_RISK_SCORE: Decimal = Decimal::ONE;
const MAX_RISK_SCORE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Scores a snapshot.
///
/// # Errors
/// Returns [`EngineError::InvalidSnapshot`](defi_engine_domain::EngineError)
/// when the snapshot fails validation, or `InvalidConfig` for a bad config.
pub fn score(snapshot: &Snapshot, config: &ScoringConfig) -> EngineResult<PortfolioAnalysis> {
    snapshot.validate()?;
    config.validate()?;

    if snapshot.is_empty() {
        return Ok(PortfolioAnalysis::neutral());
    }

    let supplied = snapshot.total_supplied();
    let borrowed = snapshot.total_borrowed();
    let weighted_collateral = weighted_collateral(snapshot, &config.health.collateral);
    let health_factor = health_factor(weighted_collateral, borrowed);

    let position_value = supplied + borrowed;
    let total_apy = if position_value.is_zero() {
        Decimal::ZERO
    } else {
        snapshot
            .positions
            .iter()
            .map(|p| p.amount * p.apy)
            .sum::<Decimal>()
            / position_value
    };

    let lending_income: Decimal = snapshot.lending().map(|p| p.amount * p.apy).sum();
    let borrowing_cost: Decimal = snapshot.borrowing().map(|p| p.amount * p.apy.abs()).sum();
    let net_equity = supplied - borrowed;
    let net_apy = if net_equity > Decimal::ZERO {
        (lending_income - borrowing_cost) / net_equity
    } else {
        Decimal::ZERO
    };

    let lp_value: Decimal = snapshot.lp_positions.iter().map(|lp| lp.liquidity).sum();
    let lp_daily: Decimal = snapshot.lp_positions.iter().map(|lp| lp.daily_accrual()).sum();
    // Income sums are already amount * APY, so accrue them at 1 %.
    let daily_earnings = daily_yield(lending_income - borrowing_cost, Decimal::ONE) + lp_daily;

    let concentration = concentration(snapshot, position_value);
    let risk_score = risk_score(
        snapshot,
        config,
        position_value,
        concentration,
        health_factor,
    );

    let analysis = PortfolioAnalysis {
        health_factor,
        total_apy,
        net_apy,
        risk_score,
        collateral_value: supplied,
        debt_value: borrowed,
        total_value: position_value + lp_value,
        daily_earnings,
        active_positions: snapshot.positions.len() + snapshot.lp_positions.len(),
        concentration,
    };

    debug!(
        health_factor = %display_health(analysis.health_factor),
        total_apy = %analysis.total_apy.round_dp(2),
        risk_score = %analysis.risk_score.round_dp(2),
        positions = analysis.active_positions,
        "Scored snapshot"
    );

    Ok(analysis)
}

/// Collateral counted towards the health factor: supplied value scaled by the
/// liquidation threshold of each protocol's risk tier.
pub fn weighted_collateral(snapshot: &Snapshot, factors: &CollateralFactors) -> Decimal {
    snapshot
        .lending()
        .map(|p| p.amount * factors.factor(protocol_risk(snapshot, &p.protocol)))
        .sum()
}

/// Weighted collateral over debt, or the sentinel when there is no debt.
///
/// Dust debt whose ratio exceeds the `Decimal` range saturates to the
/// sentinel.
pub fn health_factor(weighted_collateral: Decimal, debt: Decimal) -> Decimal {
    if debt <= Decimal::ZERO {
        return HEALTH_FACTOR_SENTINEL;
    }
    weighted_collateral
        .checked_div(debt)
        .unwrap_or(HEALTH_FACTOR_SENTINEL)
}

pub(crate) fn protocol_risk(snapshot: &Snapshot, protocol: &str) -> RiskLevel {
    // Validation guarantees the protocol is known; fall back to the riskiest
    // tier rather than panic if called on an unvalidated snapshot.
    snapshot
        .protocol(protocol)
        .map(|p| p.risk)
        .unwrap_or(RiskLevel::High)
}

fn concentration(snapshot: &Snapshot, position_value: Decimal) -> Decimal {
    if position_value.is_zero() {
        return Decimal::ZERO;
    }

    let mut by_protocol: BTreeMap<String, Decimal> = BTreeMap::new();
    for position in &snapshot.positions {
        *by_protocol
            .entry(position.protocol.to_ascii_lowercase())
            .or_default() += position.amount;
    }

    by_protocol
        .values()
        .copied()
        .max()
        .map(|largest| largest / position_value)
        .unwrap_or(Decimal::ZERO)
}

fn risk_score(
    snapshot: &Snapshot,
    config: &ScoringConfig,
    position_value: Decimal,
    concentration: Decimal,
    health_factor: Decimal,
) -> Decimal {
    let weighted_tier = if position_value.is_zero() {
        Decimal::ONE
    } else {
        snapshot
            .positions
            .iter()
            .map(|p| p.amount * protocol_risk(snapshot, &p.protocol).tier_decimal())
            .sum::<Decimal>()
            / position_value
    };

    let safety = config.health.safety_health_factor;
    let health_deficit = if health_factor < safety {
        (safety - health_factor) / safety
    } else {
        Decimal::ZERO
    };

    let raw = MIN_RISK_SCORE
        + config.tier_weight * (weighted_tier - Decimal::ONE)
        + config.concentration_weight * concentration
        + config.health_weight * health_deficit;

    raw.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE)
}

fn display_health(health_factor: Decimal) -> String {
    if health_factor == HEALTH_FACTOR_SENTINEL {
        "inf".to_string()
    } else {
        health_factor.round_dp(3).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_engine_domain::EngineError;
    use defi_engine_domain::entities::{LpPosition, Position, ProtocolInfo, TokenPair};
    use defi_engine_domain::enums::ProtocolCategory;
    use rust_decimal_macros::dec;

    fn catalog() -> Snapshot {
        Snapshot::new(ProtocolInfo::base_catalog())
    }

    #[test]
    fn test_empty_snapshot_is_neutral() {
        let analysis = score(&Snapshot::default(), &ScoringConfig::default()).unwrap();
        assert_eq!(analysis, PortfolioAnalysis::neutral());
        assert_eq!(analysis.health_factor, HEALTH_FACTOR_SENTINEL);
        assert_eq!(analysis.risk_score, dec!(1));
    }

    #[test]
    fn test_zero_debt_uses_sentinel() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)))
            .with_position(Position::lending("Seamless", "USDC", dec!(38500), dec!(15.1)));

        let analysis = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert_eq!(analysis.health_factor, HEALTH_FACTOR_SENTINEL);
        assert!(analysis.is_debt_free());
        assert!(analysis.risk_score >= dec!(1));
    }

    #[test]
    fn test_total_apy_is_size_weighted() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)))
            .with_position(Position::borrowing("Moonwell", "ETH", dec!(22000), dec!(8.2)));

        let analysis = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert!(analysis.total_apy > dec!(8.2));
        assert!(analysis.total_apy < dec!(12.5));
        // A simple average would land on 10.35.
        assert_ne!(analysis.total_apy, dec!(10.35));

        // Net yield subtracts the borrowing cost.
        let expected_net = (dec!(45000) * dec!(12.5) - dec!(22000) * dec!(8.2)) / dec!(23000);
        assert_eq!(analysis.net_apy, expected_net);
    }

    #[test]
    fn test_health_factor_uses_collateral_factors() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Aave", "ETH", dec!(5000), dec!(-3)));

        let analysis = score(&snapshot, &ScoringConfig::default()).unwrap();
        // 10000 * 0.85 / 5000
        assert_eq!(analysis.health_factor, dec!(1.7));
        assert_eq!(analysis.collateral_value, dec!(10000));
        assert_eq!(analysis.debt_value, dec!(5000));
    }

    #[test]
    fn test_health_factor_decreases_as_debt_grows() {
        let config = ScoringConfig::default();
        let mut previous = HEALTH_FACTOR_SENTINEL;
        for debt in [dec!(1000), dec!(2000), dec!(4000), dec!(8000)] {
            let snapshot = catalog()
                .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
                .with_position(Position::borrowing("Moonwell", "ETH", debt, dec!(4)));
            let hf = score(&snapshot, &config).unwrap().health_factor;
            assert!(hf < previous);
            previous = hf;
        }
    }

    #[test]
    fn test_risk_score_monotone_in_concentration() {
        let protocols = vec![
            ProtocolInfo::new("Alpha", dec!(10), dec!(1000000), RiskLevel::Medium, ProtocolCategory::Lending),
            ProtocolInfo::new("Beta", dec!(10), dec!(1000000), RiskLevel::Medium, ProtocolCategory::Lending),
        ];
        let config = ScoringConfig::default();

        let mut previous = Decimal::ZERO;
        for alpha in [dec!(5000), dec!(6000), dec!(8000), dec!(9500), dec!(10000)] {
            let snapshot = Snapshot::new(protocols.clone())
                .with_position(Position::lending("Alpha", "USDC", alpha, dec!(10)))
                .with_position(Position::lending("Beta", "USDC", dec!(10000) - alpha, dec!(10)));
            let analysis = score(&snapshot, &config).unwrap();
            assert!(analysis.risk_score >= previous);
            previous = analysis.risk_score;
        }
        assert_eq!(previous, dec!(3));
    }

    #[test]
    fn test_risk_score_rises_below_safety_factor_and_is_clamped() {
        let config = ScoringConfig::default();
        let healthy = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Aave", "ETH", dec!(2000), dec!(3)));
        let stressed = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Aave", "ETH", dec!(8000), dec!(3)));
        let underwater = catalog()
            .with_position(Position::lending("BaseSwap", "USDC", dec!(1000), dec!(5)))
            .with_position(Position::borrowing("BaseSwap", "ETH", dec!(100000), dec!(3)));

        let healthy = score(&healthy, &config).unwrap();
        let stressed = score(&stressed, &config).unwrap();
        let underwater = score(&underwater, &config).unwrap();

        assert!(stressed.risk_score > healthy.risk_score);
        assert!(underwater.risk_score <= dec!(5));
        assert_eq!(underwater.risk_score, dec!(5));
    }

    #[test]
    fn test_lp_positions_count_towards_value_and_earnings() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(36500), dec!(10)))
            .with_lp_position(LpPosition::new(TokenPair::new("ETH", "USDC"), dec!(36500), dec!(20)));

        let analysis = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert_eq!(analysis.total_value, dec!(73000));
        assert_eq!(analysis.active_positions, 2);
        // $10/day from lending, $20/day from the pool.
        assert_eq!(analysis.daily_earnings, dec!(30));
    }

    #[test]
    fn test_dust_debt_saturates_health_factor() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(1000000), dec!(5)))
            .with_position(Position::borrowing(
                "Aave",
                "ETH",
                Decimal::new(1, 28),
                dec!(3),
            ));

        let analysis = score(&snapshot, &ScoringConfig::default()).unwrap();
        assert_eq!(analysis.health_factor, HEALTH_FACTOR_SENTINEL);
        assert!(analysis.debt_value > Decimal::ZERO);
        assert_eq!(health_factor(dec!(1), Decimal::new(1, 28)), HEALTH_FACTOR_SENTINEL);
        assert_eq!(health_factor(dec!(3), dec!(2)), dec!(1.5));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let snapshot =
            catalog().with_position(Position::lending("Aave", "USDC", dec!(1000), dec!(5)));
        let config = ScoringConfig::default().with_weights(dec!(1), dec!(-2), dec!(1));
        assert!(matches!(
            score(&snapshot, &config),
            Err(EngineError::InvalidConfig { field, .. }) if field == "scoring.concentrationWeight"
        ));
    }

    #[test]
    fn test_invalid_snapshot_is_rejected_before_scoring() {
        let snapshot =
            catalog().with_position(Position::lending("Nowhere", "USDC", dec!(1), dec!(1)));
        assert!(matches!(
            score(&snapshot, &ScoringConfig::default()),
            Err(EngineError::InvalidSnapshot { .. })
        ));
    }
}
