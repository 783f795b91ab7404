pub mod analysis;
pub mod backtest_result;
pub mod compound_action;
pub mod market_analysis;
pub mod recommendation;

pub use analysis::{HEALTH_FACTOR_SENTINEL, PortfolioAnalysis};
pub use backtest_result::BacktestResult;
pub use compound_action::{CompoundAction, CompoundActionKind};
pub use market_analysis::MarketAnalysis;
pub use recommendation::{RebalanceActionKind, RebalanceRecommendation, Urgency};
