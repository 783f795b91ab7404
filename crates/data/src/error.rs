use defi_engine_domain::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading engine inputs.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("strategy '{0}' not found in catalog")]
    StrategyNotFound(String),

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

pub type DataResult<T> = Result<T, DataError>;
