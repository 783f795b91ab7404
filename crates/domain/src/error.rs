use thiserror::Error;

/// Errors surfaced by the scorer, recommenders and backtester.
///
/// Validation variants name the offending field so the caller can point at
/// the input that needs fixing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid scenario: {field}: {reason}")]
    InvalidScenario { field: String, reason: String },

    #[error("invalid snapshot: {field}: {reason}")]
    InvalidSnapshot { field: String, reason: String },

    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("backtest cancelled while simulating '{strategy}' at step {step}")]
    Cancelled { strategy: String, step: usize },
}

impl EngineError {
    pub fn invalid_scenario(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_snapshot(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
