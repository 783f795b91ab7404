//! Table rendering for command output.

use defi_engine_domain::entities::StrategySpec;
use defi_engine_domain::value_objects::{
    BacktestResult, CompoundAction, MarketAnalysis, PortfolioAnalysis, RebalanceRecommendation,
};
use defi_engine_simulation::monte_carlo::AggregateResult;
use prettytable::{Table, format, row};
use rust_decimal::Decimal;

fn table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

fn health(analysis: &PortfolioAnalysis) -> String {
    if analysis.is_debt_free() {
        "no debt".to_string()
    } else {
        analysis.health_factor.round_dp(3).to_string()
    }
}

fn usd(value: Decimal) -> String {
    format!("${}", value.round_dp(2))
}

fn pct(value: Decimal) -> String {
    format!("{}%", value.round_dp(2))
}

pub fn analysis(analysis: &PortfolioAnalysis) -> Table {
    let mut t = table();
    t.set_titles(row!["Metric", "Value"]);
    t.add_row(row!["Health factor", health(analysis)]);
    t.add_row(row!["Total APY", pct(analysis.total_apy)]);
    t.add_row(row!["Net APY", pct(analysis.net_apy)]);
    t.add_row(row!["Risk score", analysis.risk_score.round_dp(2)]);
    t.add_row(row!["Collateral", usd(analysis.collateral_value)]);
    t.add_row(row!["Debt", usd(analysis.debt_value)]);
    t.add_row(row!["Total value", usd(analysis.total_value)]);
    t.add_row(row!["Daily earnings", usd(analysis.daily_earnings)]);
    t.add_row(row!["Active positions", analysis.active_positions]);
    t.add_row(row!["Concentration", pct(analysis.concentration * Decimal::ONE_HUNDRED)]);
    t
}

pub fn rebalance(recommendations: &[RebalanceRecommendation]) -> Table {
    let mut t = table();
    t.set_titles(row![
        "#", "Action", "Protocol", "Token", "Amount", "APY", "Gain", "Gas", "Risk", "Reason"
    ]);
    for (i, rec) in recommendations.iter().enumerate() {
        t.add_row(row![
            i + 1,
            rec.action,
            rec.protocol,
            rec.token,
            rec.amount.round_dp(2),
            pct(rec.expected_apy),
            usd(rec.expected_gain_usd),
            usd(rec.estimated_gas_usd),
            rec.risk_level,
            rec.reason
        ]);
    }
    t
}

pub fn compound(actions: &[CompoundAction]) -> Table {
    let mut t = table();
    t.set_titles(row!["Pair", "Action", "Amount", "Daily yield", "Reason"]);
    for action in actions {
        t.add_row(row![
            action.pair,
            action.action,
            usd(action.amount),
            usd(action.expected_yield),
            action.reason
        ]);
    }
    t
}

pub fn backtest(results: &[BacktestResult]) -> Table {
    let mut t = table();
    t.set_titles(row![
        "Strategy", "Net return", "Annualized", "Max DD", "Sharpe", "Win rate", "Trades", "Gas"
    ]);
    for r in results {
        t.add_row(row![
            r.strategy,
            usd(r.net_return),
            pct(r.annualized_return),
            pct(r.max_drawdown),
            r.sharpe_ratio,
            pct(r.win_rate),
            r.total_trades,
            usd(r.gas_cost)
        ]);
    }
    t
}

pub fn monte_carlo(aggregates: &[AggregateResult]) -> Table {
    let mut t = table();
    t.set_titles(row![
        "Strategy", "Mean return", "Median", "VaR 95", "Mean Sharpe", "Mean DD", "Runs"
    ]);
    for a in aggregates {
        t.add_row(row![
            a.strategy,
            usd(a.mean_net_return),
            usd(a.median_net_return),
            usd(a.var_95_net_return),
            a.mean_sharpe_ratio,
            pct(a.mean_max_drawdown),
            a.iterations
        ]);
    }
    t
}

pub fn market(analysis: &MarketAnalysis) -> Table {
    let mut t = table();
    t.set_titles(row!["Condition", "Confidence", "Trends"]);
    t.add_row(row![
        analysis.condition,
        pct(analysis.confidence),
        analysis.trends.join("\n")
    ]);
    t
}

pub fn strategies(specs: &[StrategySpec]) -> Table {
    let mut t = table();
    t.set_titles(row!["Strategy", "Risk", "Expected APY", "Description"]);
    for s in specs {
        t.add_row(row![s.name, s.risk_level, pct(s.expected_apy), s.description]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use defi_engine_domain::entities::{LpPosition, TokenPair};
    use defi_engine_domain::value_objects::CompoundActionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_neutral_analysis_renders_no_debt() {
        let rendered = analysis(&PortfolioAnalysis::neutral()).to_string();
        assert!(rendered.contains("no debt"));
        assert!(rendered.contains("Risk score"));
    }

    #[test]
    fn test_one_row_per_item() {
        let lp = LpPosition::new(TokenPair::new("ETH", "USDC"), dec!(1000), dec!(20));
        let action = CompoundAction {
            pair: lp.pair.clone(),
            action: CompoundActionKind::Hold,
            amount: Decimal::ZERO,
            expected_yield: lp.daily_accrual(),
            reason: "quiet".to_string(),
        };
        let t = compound(&[action.clone(), action]);
        assert_eq!(t.len(), 2);
        assert!(t.to_string().contains("ETH/USDC"));
    }

    #[test]
    fn test_strategy_table() {
        let t = strategies(&StrategySpec::default_catalog());
        assert_eq!(t.len(), StrategySpec::default_catalog().len());
    }
}
