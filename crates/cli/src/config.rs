//! Engine configuration file.

use anyhow::{Context, Result, bail};
use defi_engine_advisor::config::{CompoundConfig, RebalanceConfig, ScoringConfig};
use defi_engine_data::providers::json::load_json;
use defi_engine_simulation::config::BacktestConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Every tunable of the engine. Missing sections fall back to defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub rebalance: RebalanceConfig,
    pub compound: CompoundConfig,
    pub backtest: BacktestConfig,
}

impl EngineConfig {
    /// Loads `path` if given, otherwise the defaults, and validates the result.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => load_json::<EngineConfig>(path)
                .await
                .with_context(|| format!("loading engine config from {}", path.display()))?,
            None => EngineConfig::default(),
        };
        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Validates every section and rejects sections that must agree but do
    /// not: the health policy of scoring and rebalancing, and the compound
    /// rules of the recommender and the backtester.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate().context("scoring section")?;
        self.rebalance.validate().context("rebalance section")?;
        self.compound.validate().context("compound section")?;
        self.backtest.validate().context("backtest section")?;

        if self.scoring.health != self.rebalance.health {
            bail!("rebalance.health must match scoring.health");
        }
        if self.compound != self.backtest.compound {
            bail!("backtest.compound must match compound");
        }
        Ok(())
    }
}
