//! Rebalance recommendations for money-market positions.
//!
//! Two triggers produce actions:
//! - a health factor under the safety threshold, answered with repayments
//!   sized to restore the threshold plus a margin;
//! - an APY gap between a lending position and the best venue of acceptable
//!   risk, answered with a capped withdraw/deposit pair.
//!
//! Every action must pay for its gas within the amortization horizon.

use crate::config::RebalanceConfig;
use crate::scorer::{health_factor, protocol_risk, weighted_collateral};
use defi_engine_domain::{EngineError, EngineResult};
use defi_engine_domain::entities::{Position, Snapshot};
use defi_engine_domain::enums::{ProtocolCategory, RiskLevel};
use defi_engine_domain::metrics::apy::yield_over;
use defi_engine_domain::value_objects::{
    PortfolioAnalysis, RebalanceActionKind, RebalanceRecommendation, Urgency,
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

/// Where capital could earn the most at an acceptable risk tier.
#[derive(Debug, Clone, PartialEq)]
struct Venue {
    protocol: String,
    apy: Decimal,
    risk: RiskLevel,
}

/// Derives an ordered list of rebalance actions.
///
/// Health actions come first, least healthy projection first, followed by
/// yield moves ordered by APY gain. The snapshot is never modified.
///
/// # Errors
/// Returns an error when the snapshot or configuration is invalid, or when
/// `analysis` was scored under a different health policy than `config.health`.
pub fn recommend_rebalance(
    snapshot: &Snapshot,
    analysis: &PortfolioAnalysis,
    config: &RebalanceConfig,
) -> EngineResult<Vec<RebalanceRecommendation>> {
    snapshot.validate()?;
    config.validate()?;

    let expected = health_factor(
        weighted_collateral(snapshot, &config.health.collateral),
        snapshot.total_borrowed(),
    );
    if expected != analysis.health_factor {
        return Err(EngineError::invalid_config(
            "rebalance.health.collateral",
            format!(
                "analysis reports health factor {} but these collateral factors give {}",
                analysis.health_factor.round_dp(4),
                expected.round_dp(4),
            ),
        ));
    }

    let (mut health, repaid) = health_actions(snapshot, analysis, config);
    health.sort_by(|a, b| a.projected_health_factor.cmp(&b.projected_health_factor));

    let mut yield_moves = yield_actions(snapshot, config, repaid);
    yield_moves.sort_by(|a, b| b.expected_apy_gain.cmp(&a.expected_apy_gain));

    debug!(
        health_actions = health.len(),
        yield_actions = yield_moves.len(),
        "Generated rebalance recommendations"
    );

    health.extend(yield_moves);
    Ok(health)
}

/// Repayments restoring the health factor. Also returns the total repaid so
/// yield moves are checked against the post-repayment debt.
fn health_actions(
    snapshot: &Snapshot,
    analysis: &PortfolioAnalysis,
    config: &RebalanceConfig,
) -> (Vec<RebalanceRecommendation>, Decimal) {
    let mut actions = Vec::new();
    let mut repaid = Decimal::ZERO;

    if !analysis.is_below(config.health.safety_health_factor) {
        return (actions, repaid);
    }

    let collateral = weighted_collateral(snapshot, &config.health.collateral);
    let debt = snapshot.total_borrowed();
    let target = config.target_health_factor();
    let current = health_factor(collateral, debt);

    // Debt level at which collateral / debt == target.
    let mut remaining = debt - collateral.checked_div(target).unwrap_or(Decimal::MAX);
    if remaining <= Decimal::ZERO {
        return (actions, repaid);
    }

    let mut borrows: Vec<&Position> = snapshot
        .borrowing()
        .filter(|p| p.amount > Decimal::ZERO)
        .collect();
    borrows.sort_by(|a, b| {
        b.apy
            .abs()
            .cmp(&a.apy.abs())
            .then_with(|| b.amount.cmp(&a.amount))
            .then_with(|| a.protocol.cmp(&b.protocol))
    });

    for position in borrows {
        if remaining <= Decimal::ZERO {
            break;
        }

        let amount = remaining
            .min(position.amount)
            .round_dp_with_strategy(2, RoundingStrategy::AwayFromZero)
            .min(position.amount);
        let cost_apy = position.apy.abs();
        let gain = yield_over(amount, cost_apy, config.gas.amortization_days);
        let check = config.gas.check(1, gain);
        if !check.is_profitable {
            warn!(
                protocol = %position.protocol,
                amount = %amount,
                expected_gain = %check.expected_gain.round_dp(2),
                estimated_gas = %check.estimated_gas,
                "Skipping repayment that does not cover its gas"
            );
            continue;
        }

        repaid += amount;
        remaining -= amount;
        let projected = health_factor(collateral, debt - repaid);

        actions.push(RebalanceRecommendation {
            action: RebalanceActionKind::Repay,
            protocol: position.protocol.clone(),
            token: position.token.clone(),
            amount,
            expected_apy: cost_apy,
            expected_apy_gain: cost_apy,
            expected_gain_usd: gain,
            estimated_gas_usd: check.estimated_gas,
            risk_level: protocol_risk(snapshot, &position.protocol),
            urgency: Urgency::Health,
            projected_health_factor: Some(projected),
            reason: format!(
                "Health factor {} is below {}; repaying {} {} on {} lifts it to {}",
                current.round_dp(2),
                config.health.safety_health_factor,
                amount,
                position.token,
                position.protocol,
                projected.round_dp(2),
            ),
        });
    }

    (actions, repaid)
}

/// Withdraw/deposit pairs moving capital towards the best acceptable venue.
fn yield_actions(
    snapshot: &Snapshot,
    config: &RebalanceConfig,
    repaid: Decimal,
) -> Vec<RebalanceRecommendation> {
    let mut actions = Vec::new();

    let Some(target) = best_venue(snapshot, config) else {
        return actions;
    };

    let debt = snapshot.total_borrowed() - repaid;
    let mut collateral = weighted_collateral(snapshot, &config.health.collateral);
    let move_cap = snapshot.total_supplied() * config.max_move_fraction;
    let days = config.gas.amortization_days;

    let mut sources: Vec<&Position> = snapshot
        .lending()
        .filter(|p| p.amount > Decimal::ZERO)
        .collect();
    sources.sort_by(|a, b| a.apy.cmp(&b.apy).then_with(|| a.protocol.cmp(&b.protocol)));

    for source in sources {
        let spread = target.apy - source.apy;
        if spread <= config.apy_spread_threshold {
            // Sources are sorted by APY; the gap only narrows from here.
            break;
        }
        if source.protocol.eq_ignore_ascii_case(&target.protocol) {
            continue;
        }

        let amount = source
            .amount
            .min(move_cap)
            .round_dp_with_strategy(2, RoundingStrategy::ToZero);
        if amount <= Decimal::ZERO {
            continue;
        }

        let source_risk = protocol_risk(snapshot, &source.protocol);
        let moved_collateral = collateral - amount * config.health.collateral.factor(source_risk)
            + amount * config.health.collateral.factor(target.risk);
        let projected = health_factor(moved_collateral, debt);
        if debt > Decimal::ZERO && projected < config.health.safety_health_factor {
            debug!(
                from = %source.protocol,
                to = %target.protocol,
                projected_health_factor = %projected.round_dp(3),
                "Skipping yield move that would breach the safety health factor"
            );
            continue;
        }

        let gain = yield_over(amount, spread, days);
        let check = config.gas.check(2, gain);
        if !check.is_profitable {
            warn!(
                from = %source.protocol,
                to = %target.protocol,
                expected_gain = %check.expected_gain.round_dp(2),
                estimated_gas = %check.estimated_gas,
                "Skipping yield move that does not cover its gas"
            );
            continue;
        }

        collateral = moved_collateral;
        let half_gain = gain / Decimal::TWO;
        let half_gas = check.estimated_gas / Decimal::TWO;

        actions.push(RebalanceRecommendation {
            action: RebalanceActionKind::Withdraw,
            protocol: source.protocol.clone(),
            token: source.token.clone(),
            amount,
            expected_apy: source.apy.max(Decimal::ZERO),
            expected_apy_gain: spread,
            expected_gain_usd: half_gain,
            estimated_gas_usd: half_gas,
            risk_level: source_risk,
            urgency: Urgency::Yield,
            projected_health_factor: None,
            reason: format!(
                "{} pays {}% against {}% on {}; withdraw {} {} to redeploy",
                source.protocol, source.apy, target.apy, target.protocol, amount, source.token,
            ),
        });
        actions.push(RebalanceRecommendation {
            action: RebalanceActionKind::Deposit,
            protocol: target.protocol.clone(),
            token: source.token.clone(),
            amount,
            expected_apy: target.apy.max(Decimal::ZERO),
            expected_apy_gain: spread,
            expected_gain_usd: half_gain,
            estimated_gas_usd: half_gas,
            risk_level: target.risk,
            urgency: Urgency::Yield,
            projected_health_factor: None,
            reason: format!(
                "Deposit {} {} into {} for +{} points of APY, about ${} over {} days",
                amount,
                source.token,
                target.protocol,
                spread,
                gain.round_dp(2),
                days,
            ),
        });
    }

    actions
}

/// Highest-APY lending venue whose risk tier is acceptable, drawn from the
/// snapshot's own positions and its protocol catalog.
fn best_venue(snapshot: &Snapshot, config: &RebalanceConfig) -> Option<Venue> {
    let from_positions = snapshot.lending().map(|p| Venue {
        protocol: p.protocol.clone(),
        apy: p.apy,
        risk: protocol_risk(snapshot, &p.protocol),
    });
    let from_catalog = snapshot
        .protocols
        .iter()
        .filter(|p| p.category == ProtocolCategory::Lending)
        .map(|p| Venue {
            protocol: p.name.clone(),
            apy: p.apy,
            risk: p.risk,
        });

    from_positions
        .chain(from_catalog)
        .filter(|v| v.risk <= config.max_risk_level)
        .max_by(|a, b| {
            a.apy
                .cmp(&b.apy)
                .then_with(|| b.risk.cmp(&a.risk))
                .then_with(|| b.protocol.cmp(&a.protocol))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollateralFactors, HealthPolicy, ScoringConfig};
    use crate::gas::GasPolicy;
    use crate::scorer::score;
    use defi_engine_domain::entities::ProtocolInfo;
    use rust_decimal_macros::dec;

    fn evaluate(snapshot: &Snapshot, config: &RebalanceConfig) -> Vec<RebalanceRecommendation> {
        let analysis = score(snapshot, &ScoringConfig::default()).unwrap();
        recommend_rebalance(snapshot, &analysis, config).unwrap()
    }

    fn catalog() -> Snapshot {
        Snapshot::new(ProtocolInfo::base_catalog())
    }

    #[test]
    fn test_balanced_portfolio_needs_nothing() {
        let snapshot = catalog()
            .with_position(Position::lending("Seamless", "USDC", dec!(10000), dec!(18.7)));
        assert!(evaluate(&snapshot, &RebalanceConfig::default()).is_empty());
    }

    #[test]
    fn test_repay_restores_target_health_factor() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Moonwell", "ETH", dec!(7000), dec!(8.2)));

        // Keep the yield trigger quiet so only the health action shows.
        let config = RebalanceConfig::default().with_apy_spread_threshold(dec!(50));
        let recs = evaluate(&snapshot, &config);

        assert_eq!(recs.len(), 1);
        let repay = &recs[0];
        assert_eq!(repay.action, RebalanceActionKind::Repay);
        assert_eq!(repay.urgency, Urgency::Health);
        // 7000 - 8500 / 1.7
        assert_eq!(repay.amount, dec!(2000));
        assert_eq!(repay.projected_health_factor, Some(dec!(1.7)));
        assert!(repay.projected_health_factor.unwrap() > config.health.safety_health_factor);
    }

    #[test]
    fn test_most_expensive_debt_is_repaid_first() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Aave", "USDC", dec!(3500), dec!(4)))
            .with_position(Position::borrowing("Moonwell", "ETH", dec!(3500), dec!(9)));

        let config = RebalanceConfig::default().with_apy_spread_threshold(dec!(50));
        let recs = evaluate(&snapshot, &config);

        assert!(!recs.is_empty());
        assert_eq!(recs[0].protocol, "Moonwell");
        let projections: Vec<_> = recs.iter().filter_map(|r| r.projected_health_factor).collect();
        assert!(projections.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_yield_move_towards_best_acceptable_venue() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)))
            .with_position(Position::lending("Seamless", "USDC", dec!(38500), dec!(15.1)));

        let recs = evaluate(&snapshot, &RebalanceConfig::default());

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].action, RebalanceActionKind::Withdraw);
        assert_eq!(recs[0].protocol, "Aave");
        assert_eq!(recs[1].action, RebalanceActionKind::Deposit);
        assert_eq!(recs[1].protocol, "Seamless");
        // Capped at 25% of the 83,500 supplied.
        assert_eq!(recs[0].amount, dec!(20875));
        assert_eq!(recs[0].expected_apy_gain, dec!(6.2));
    }

    #[test]
    fn test_risk_ceiling_limits_the_venue() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)));

        // Only Low-tier venues: Moonwell at 15.2 is 2.7 points away.
        let config = RebalanceConfig::default().with_max_risk_level(RiskLevel::Low);
        assert!(evaluate(&snapshot, &config).is_empty());
    }

    #[test]
    fn test_gas_never_exceeds_fraction_of_gain() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)))
            .with_position(Position::lending("Moonwell", "USDC", dec!(900), dec!(3)))
            .with_position(Position::borrowing("Aave", "ETH", dec!(30000), dec!(6)));

        for gas_cost in [dec!(0.5), dec!(5), dec!(20), dec!(60), dec!(250)] {
            for fraction in [dec!(0.1), dec!(0.5), dec!(1)] {
                let config = RebalanceConfig::default().with_gas(
                    GasPolicy::default()
                        .with_gas_cost(gas_cost)
                        .with_max_gas_fraction(fraction),
                );
                for rec in evaluate(&snapshot, &config) {
                    assert!(
                        rec.estimated_gas_usd <= fraction * rec.expected_gain_usd,
                        "{rec:?} breaks the gas rule"
                    );
                }
            }
        }
    }

    #[test]
    fn test_expensive_gas_suppresses_moves() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(45000), dec!(12.5)));
        let config =
            RebalanceConfig::default().with_gas(GasPolicy::default().with_gas_cost(dec!(100)));
        assert!(evaluate(&snapshot, &config).is_empty());
    }

    #[test]
    fn test_yield_move_cannot_breach_safety_factor() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Aave", "ETH", dec!(5600), dec!(1)));

        // HF is 1.518; moving 2,500 into a Medium-tier venue would drop it
        // to 1.4955.
        assert!(evaluate(&snapshot, &RebalanceConfig::default()).is_empty());
    }

    #[test]
    fn test_health_actions_precede_yield_actions() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Moonwell", "ETH", dec!(7000), dec!(8.2)));

        let recs = evaluate(&snapshot, &RebalanceConfig::default());
        let kinds: Vec<_> = recs.iter().map(|r| r.action).collect();
        assert_eq!(
            kinds,
            vec![
                RebalanceActionKind::Repay,
                RebalanceActionKind::Withdraw,
                RebalanceActionKind::Deposit,
            ]
        );
        assert!(recs.iter().all(|r| r.amount > Decimal::ZERO));
        assert!(recs.iter().all(|r| r.expected_apy >= Decimal::ZERO));
    }

    #[test]
    fn test_analysis_from_another_health_policy_is_rejected() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(10000), dec!(5)))
            .with_position(Position::borrowing("Moonwell", "ETH", dec!(5000), dec!(8.2)));

        let strict = HealthPolicy::default().with_collateral(CollateralFactors {
            low: dec!(0.5),
            medium: dec!(0.5),
            high: dec!(0.5),
        });
        // Scored at HF 1.0 under the strict factors, 1.7 under the defaults.
        let analysis = score(&snapshot, &ScoringConfig::default().with_health(strict.clone())).unwrap();
        assert_eq!(analysis.health_factor, dec!(1));

        let err = recommend_rebalance(&snapshot, &analysis, &RebalanceConfig::default()).unwrap_err();
        assert!(
            matches!(&err, EngineError::InvalidConfig { field, .. } if field == "rebalance.health.collateral"),
            "{err:?}"
        );

        // The same policy on both sides produces the repayment.
        let config = RebalanceConfig::default()
            .with_health(strict)
            .with_apy_spread_threshold(dec!(50));
        let recs = recommend_rebalance(&snapshot, &analysis, &config).unwrap();
        assert_eq!(recs[0].action, RebalanceActionKind::Repay);
        let projected = recs[0].projected_health_factor.unwrap();
        assert!(projected >= dec!(1.7) && projected < dec!(1.7001), "{projected}");
    }

    #[test]
    fn test_dust_debt_needs_no_repayment() {
        let snapshot = catalog()
            .with_position(Position::lending("Aave", "USDC", dec!(1000000), dec!(5)))
            .with_position(Position::borrowing("Aave", "ETH", Decimal::new(1, 28), dec!(3)));
        let config = RebalanceConfig::default().with_apy_spread_threshold(dec!(50));
        assert!(evaluate(&snapshot, &config).is_empty());
    }
}
