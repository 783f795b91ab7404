pub mod lp_position;
pub mod position;
pub mod protocol;
pub mod scenario;
pub mod snapshot;
pub mod strategy;

// Re-export for easier access
pub use lp_position::{LpPosition, TokenPair};
pub use position::Position;
pub use protocol::ProtocolInfo;
pub use scenario::BacktestScenario;
pub use snapshot::Snapshot;
pub use strategy::StrategySpec;
