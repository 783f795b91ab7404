//! Compound / rebalance / hold advice for liquidity-pool positions.

use crate::config::CompoundConfig;
use defi_engine_domain::entities::LpPosition;
use defi_engine_domain::value_objects::{CompoundAction, CompoundActionKind};
use rust_decimal::Decimal;
use tracing::debug;

/// Evaluates every LP position against the compound and IL rules.
///
/// The two rules are independent: a position with a large impermanent loss
/// and enough rewards yields both a `rebalance` and a `compound` action.
/// A position that triggers neither gets a single `hold`.
///
/// Output order: rebalances by absolute IL descending, then compounds by
/// daily yield descending, then holds in input order.
pub fn recommend_compound(
    lp_positions: &[LpPosition],
    config: &CompoundConfig,
) -> Vec<CompoundAction> {
    let mut rebalances = Vec::new();
    let mut compounds = Vec::new();
    let mut holds = Vec::new();
    let threshold = config.compound_threshold();

    for position in lp_positions {
        let expected_yield = position.daily_accrual();
        let il_alarm = config.il_alarm(position.impermanent_loss);
        let compound = config.should_compound(position.pending_rewards);

        if il_alarm {
            let action = CompoundAction {
                pair: position.pair.clone(),
                action: CompoundActionKind::Rebalance,
                amount: position.liquidity,
                expected_yield,
                reason: format!(
                    "Impermanent loss of {}% exceeds the {}% alarm",
                    position.impermanent_loss.abs(),
                    config.il_alarm_pct,
                ),
            };
            rebalances.push((position.impermanent_loss.abs(), action));
        }

        if compound {
            compounds.push(CompoundAction {
                pair: position.pair.clone(),
                action: CompoundActionKind::Compound,
                amount: position.pending_rewards,
                expected_yield,
                reason: format!(
                    "Pending rewards of ${} clear the ${} threshold",
                    position.pending_rewards.round_dp(2),
                    threshold.round_dp(2),
                ),
            });
        }

        if !il_alarm && !compound {
            holds.push(CompoundAction {
                pair: position.pair.clone(),
                action: CompoundActionKind::Hold,
                amount: Decimal::ZERO,
                expected_yield,
                reason: format!(
                    "Rewards of ${} are below the ${} threshold",
                    position.pending_rewards.round_dp(2),
                    threshold.round_dp(2),
                ),
            });
        }
    }

    rebalances.sort_by(|a, b| b.0.cmp(&a.0));
    compounds.sort_by(|a, b| b.expected_yield.cmp(&a.expected_yield));

    debug!(
        positions = lp_positions.len(),
        rebalances = rebalances.len(),
        compounds = compounds.len(),
        holds = holds.len(),
        "Evaluated LP positions"
    );

    let mut actions: Vec<CompoundAction> = rebalances.into_iter().map(|(_, a)| a).collect();
    actions.extend(compounds);
    actions.extend(holds);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_engine_domain::entities::TokenPair;
    use rust_decimal_macros::dec;

    fn lp(token0: &str, token1: &str, liquidity: Decimal, apy: Decimal) -> LpPosition {
        LpPosition::new(TokenPair::new(token0, token1), liquidity, apy)
    }

    fn cheap_gas() -> CompoundConfig {
        CompoundConfig::default().with_gas_cost(dec!(0.001))
    }

    #[test]
    fn test_large_rewards_are_compounded() {
        let positions = [lp("ETH", "USDC", dec!(10000), dec!(24.8)).with_pending_rewards(dec!(50))];
        let actions = recommend_compound(&positions, &cheap_gas());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, CompoundActionKind::Compound);
        assert_eq!(actions[0].amount, dec!(50));
        assert_eq!(actions[0].expected_yield, positions[0].daily_accrual());
    }

    #[test]
    fn test_dust_rewards_are_held_even_with_cheap_gas() {
        let positions = [lp("ETH", "USDC", dec!(10000), dec!(24.8)).with_pending_rewards(dec!(0.01))];
        let actions = recommend_compound(&positions, &cheap_gas());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, CompoundActionKind::Hold);
    }

    #[test]
    fn test_rewards_must_beat_gas_by_safety_factor() {
        let config = CompoundConfig::default()
            .with_gas_cost(dec!(10))
            .with_gas_safety_factor(dec!(2));
        let positions = [
            lp("ETH", "USDC", dec!(1000), dec!(20)).with_pending_rewards(dec!(15)),
            lp("WBTC", "ETH", dec!(1000), dec!(20)).with_pending_rewards(dec!(20.01)),
        ];
        let actions = recommend_compound(&positions, &config);

        assert_eq!(actions[0].action, CompoundActionKind::Compound);
        assert_eq!(actions[0].pair, TokenPair::new("WBTC", "ETH"));
        assert_eq!(actions[1].action, CompoundActionKind::Hold);
    }

    #[test]
    fn test_impermanent_loss_triggers_rebalance_without_rewards() {
        let positions = [lp("ETH", "USDC", dec!(5000), dec!(30)).with_impermanent_loss(dec!(-7.5))];
        let actions = recommend_compound(&positions, &cheap_gas());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, CompoundActionKind::Rebalance);
        assert_eq!(actions[0].amount, dec!(5000));
    }

    #[test]
    fn test_both_rules_fire_independently() {
        let positions = [lp("ETH", "USDC", dec!(5000), dec!(30))
            .with_pending_rewards(dec!(80))
            .with_impermanent_loss(dec!(12))];
        let kinds: Vec<_> = recommend_compound(&positions, &cheap_gas())
            .into_iter()
            .map(|a| a.action)
            .collect();

        assert_eq!(
            kinds,
            vec![CompoundActionKind::Rebalance, CompoundActionKind::Compound]
        );
    }

    #[test]
    fn test_ordering() {
        let positions = [
            lp("A", "B", dec!(1000), dec!(10)),
            lp("C", "D", dec!(1000), dec!(10)).with_impermanent_loss(dec!(-6)),
            lp("E", "F", dec!(1000), dec!(10)).with_pending_rewards(dec!(40)),
            lp("G", "H", dec!(1000), dec!(10)).with_impermanent_loss(dec!(-20)),
            lp("I", "J", dec!(9000), dec!(10)).with_pending_rewards(dec!(40)),
            lp("K", "L", dec!(1000), dec!(10)),
        ];
        let order: Vec<String> = recommend_compound(&positions, &cheap_gas())
            .iter()
            .map(|a| format!("{}:{}", a.action, a.pair))
            .collect();

        assert_eq!(
            order,
            vec![
                "rebalance:G/H",
                "rebalance:C/D",
                "compound:I/J",
                "compound:E/F",
                "hold:A/B",
                "hold:K/L",
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(recommend_compound(&[], &CompoundConfig::default()).is_empty());
    }
}
