//! Command line interface for the DeFi portfolio engine.
mod config;
mod output;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use config::EngineConfig;
use defi_engine_advisor::prelude::*;
use defi_engine_data::prelude::*;
use defi_engine_domain::EngineResult;
use defi_engine_domain::entities::{BacktestScenario, StrategySpec};
use defi_engine_domain::enums::MarketCondition;
use defi_engine_optimization::{Objective, rank_results};
use defi_engine_simulation::prelude::*;
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "defi-engine")]
#[command(about = "DeFi portfolio scoring, rebalance advice and strategy backtesting", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true, env = "DEFI_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a portfolio snapshot
    Score {
        /// Snapshot file (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Recommend rebalance actions for a snapshot
    Rebalance {
        /// Snapshot file (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Recommend compound / rebalance / hold for the snapshot's LP positions
    Compound {
        /// Snapshot file (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Backtest strategies against a seeded or historical market path
    Backtest {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Rank results by this objective
        #[arg(long, default_value_t = Objective::NetReturn)]
        rank: Objective,
    },
    /// Repeat a backtest over consecutive seeds and aggregate
    MonteCarlo {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Number of seeds to run
        #[arg(short, long, default_value_t = 100)]
        iterations: usize,
    },
    /// Classify a price series as bull, bear or sideways
    Market {
        /// Price file (JSON); a synthetic path is generated when omitted
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Market condition of the synthetic path
        #[arg(short, long, default_value = "sideways")]
        market: MarketCondition,

        /// Days of synthetic history
        #[arg(short, long, default_value_t = 90)]
        days: u32,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// List available strategies
    Strategies {
        /// Strategy catalog file (JSON); the built-in catalog when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// Initial capital in USD
    #[arg(long, default_value = "10000")]
    capital: Decimal,

    /// Days to simulate
    #[arg(short, long, default_value_t = 90)]
    days: u32,

    /// Market condition: bull, bear or sideways
    #[arg(short, long, default_value = "sideways")]
    market: MarketCondition,

    /// Strategy names to include (repeatable); all when omitted
    #[arg(short, long = "strategy")]
    strategies: Vec<String>,

    /// Strategy catalog file (JSON); the built-in catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Replay this price file instead of a synthetic path
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Random seed for the synthetic path
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).await?;
    let json = cli.json;

    match cli.command {
        Commands::Score { snapshot } => {
            let snapshot = JsonSnapshotFile::new(snapshot).snapshot().await?;
            let analysis = score(&snapshot, &config.scoring)?;
            emit(json, &analysis, || output::analysis(&analysis))?;
        }
        Commands::Rebalance { snapshot } => {
            let snapshot = JsonSnapshotFile::new(snapshot).snapshot().await?;
            let analysis = score(&snapshot, &config.scoring)?;
            let recommendations = recommend_rebalance(&snapshot, &analysis, &config.rebalance)?;
            if recommendations.is_empty() && !json {
                println!("Portfolio is balanced; no actions recommended.");
            } else {
                emit(json, &recommendations, || output::rebalance(&recommendations))?;
            }
        }
        Commands::Compound { snapshot } => {
            let snapshot = JsonSnapshotFile::new(snapshot).snapshot().await?;
            let actions = recommend_compound(&snapshot.lp_positions, &config.compound);
            emit(json, &actions, || output::compound(&actions))?;
        }
        Commands::Backtest { scenario, rank } => {
            let backtester = Backtester::new(config.backtest.clone());
            let (scenario_value, path) = build_scenario(&scenario).await?;
            let seed = scenario.seed;
            let results = run_cancellable(move |token| match path {
                Some(path) => backtester.run_with_path(&scenario_value, &path, &token),
                None => backtester.run(&scenario_value, seed, &token),
            })
            .await?;
            let ranked = rank_results(results, rank.function());
            emit(json, &ranked, || output::backtest(&ranked))?;
        }
        Commands::MonteCarlo {
            scenario,
            iterations,
        } => {
            if scenario.prices.is_some() {
                bail!("monte-carlo runs synthetic paths only; drop --prices");
            }
            let (scenario_value, _) = build_scenario(&scenario).await?;
            let runner = MonteCarloRunner::new(
                Backtester::new(config.backtest.clone()),
                scenario_value,
                iterations,
            )
            .with_base_seed(scenario.seed);
            let aggregates = run_cancellable(move |token| runner.run(&token)).await?;
            emit(json, &aggregates, || output::monte_carlo(&aggregates))?;
        }
        Commands::Market {
            prices,
            market,
            days,
            seed,
        } => {
            let series = match prices {
                Some(path) => JsonPriceFile::new(path).prices().await?,
                None => {
                    let scenario = BacktestScenario::new(Decimal::ONE, days, market);
                    let path = Backtester::new(config.backtest.clone()).generate_path(&scenario, seed)?;
                    PriceSeries {
                        steps_per_day: path.steps_per_day,
                        prices: path.prices(),
                    }
                }
            };
            let analysis = analyze_market(&series.prices, series.steps_per_day)?;
            emit(json, &analysis, || output::market(&analysis))?;
        }
        Commands::Strategies { catalog } => {
            let specs = load_catalog(catalog).await?;
            emit(json, &specs, || output::strategies(&specs))?;
        }
    }

    Ok(())
}

/// Prints `value` as JSON or as the table built by `table`.
fn emit<T: Serialize>(json: bool, value: &T, table: impl FnOnce() -> prettytable::Table) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        table().printstd();
    }
    Ok(())
}

async fn load_catalog(path: Option<PathBuf>) -> Result<Vec<StrategySpec>> {
    let specs = match path {
        Some(path) => JsonStrategyFile::new(path).strategies().await?,
        None => StaticCatalog::builtin().strategies().await?,
    };
    Ok(specs)
}

async fn build_scenario(args: &ScenarioArgs) -> Result<(BacktestScenario, Option<MarketPath>)> {
    let catalog: Box<dyn StrategyCatalog> = match &args.catalog {
        Some(path) => Box::new(JsonStrategyFile::new(path)),
        None => Box::new(StaticCatalog::builtin()),
    };

    let strategies = if args.strategies.is_empty() {
        catalog.strategies().await?
    } else {
        let mut picked = Vec::with_capacity(args.strategies.len());
        for name in &args.strategies {
            picked.push(catalog.find(name).await?);
        }
        picked
    };

    let path = match &args.prices {
        Some(file) => {
            let series = JsonPriceFile::new(file).prices().await?;
            Some(
                MarketPath::from_prices(&series.prices, series.steps_per_day)
                    .with_context(|| format!("replaying {}", file.display()))?,
            )
        }
        None => None,
    };

    let days = match &path {
        Some(path) => path.days().ceil() as u32,
        None => args.days,
    };

    let scenario = strategies.into_iter().fold(
        BacktestScenario::new(args.capital, days, args.market),
        BacktestScenario::with_strategy,
    );
    Ok((scenario, path))
}

/// Runs blocking engine work on the blocking pool, cancelling it on Ctrl-C.
async fn run_cancellable<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> EngineResult<T> + Send + 'static,
{
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let handle = tokio::task::spawn_blocking(move || work(worker_token));

    let watcher_token = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling backtest");
            watcher_token.cancel();
        }
    });

    let outcome = handle.await.context("backtest task panicked")?;
    watcher.abort();
    let value = outcome?;
    info!("Backtest finished");
    Ok(value)
}
