mod chain;
mod cli;
mod config;
mod error;
mod logging;
mod store;

use chain::SimulatedChain;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command, LedgerCommand, StrategyCommand};
use config::Config;
use error::CoreError;
use rust_decimal_macros::dec;
use std::sync::Arc;
use strategy_execution::TradeExecutor;
use strategy_ledger::{Ledger, StrategyId, TimeRange};
use strategy_runtime::{ParamSpec, RuntimeHost, Strategy, StrategyProgram};
use strategy_types::{Address, ExecutionMode};

/// Demo pairs seeded into the in-process chain simulator so a freshly
/// deployed strategy has something to trade against without a separate
/// bootstrap step. A real deployment replaces [`SimulatedChain`] with a
/// live client wired to the same traits.
const DEMO_PAIRS: &[(&str, &str, &str)] = &[
    ("0x0000000000000000000000000000000000000001", "1000", "1000000"),
    ("0x0000000000000000000000000000000000000002", "250", "4000000"),
];

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    logging::init_logging();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Run => run(config).await,
        Command::Strategy { command } => strategy_command(config, command).await,
        Command::Ledger { command } => ledger_command(config, command).await,
    }
}

/// Builds the host and restores its strategy registry from disk — the
/// Ledger's run/trade history is process-lifetime only (`store.rs`'s
/// doc comment explains why), so a host built this way always starts
/// with an empty Ledger even when strategies are restored as `active`.
async fn build_host(config: &Config) -> Result<Arc<RuntimeHost>, CoreError> {
    let chain = Arc::new(SimulatedChain::new(dec!(3000)));
    let now = Utc::now();
    for (pair, eth_reserve, token_reserve) in DEMO_PAIRS {
        let pair: Address = pair.parse().map_err(|e: strategy_types::TypesError| CoreError::Config(e.to_string()))?;
        chain.seed_pair(pair, eth_reserve.parse().unwrap(), token_reserve.parse().unwrap(), now).await;
    }

    let credential = config.venue_credential(now);
    let executor = Arc::new(TradeExecutor::new(
        chain.clone(),
        Some(chain.clone()),
        None,
        config.executor_config()?,
        credential,
    ));

    let wallet = config.operator_address.clone().unwrap_or_else(|| {
        "0x0000000000000000000000000000000000000ff0".parse().expect("well-formed literal")
    });

    let host = Arc::new(RuntimeHost::new(
        Arc::new(Ledger::new()),
        executor,
        chain.clone(),
        chain.clone(),
        chain.clone(),
        wallet,
        if config.dry_run { ExecutionMode::Simulated } else { ExecutionMode::Direct },
        config.dry_run,
        config.risk_ceilings,
    ));

    for strategy in store::load(&config.strategy_store_path).await? {
        host.upsert_strategy(strategy).await;
    }

    Ok(host)
}

/// `run`: build the host, resume every strategy whose persisted status
/// is `active`, and serve until SIGINT/SIGTERM.
async fn run(config: Config) -> Result<(), CoreError> {
    let host = build_host(&config).await?;
    host.resume_active_strategies().await;
    tracing::info!(dry_run = config.dry_run, "strategy-core listening");

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("shutdown requested, stopping live strategies");
    for strategy in host.all_strategies().await {
        if host.live_lifecycle(&strategy.id).await.is_some() {
            host.stop(&strategy.id).await.ok();
        }
    }
    store::save(&config.strategy_store_path, &host).await
}

async fn strategy_command(config: Config, command: StrategyCommand) -> Result<(), CoreError> {
    let host = build_host(&config).await?;

    match command {
        StrategyCommand::List => {
            for strategy in host.all_strategies().await {
                println!("{}\t{}\t{}", strategy.id, strategy.status, strategy.name);
            }
        }
        StrategyCommand::Show { strategy_id } => {
            let strategy = host
                .get_strategy(&StrategyId(strategy_id.clone()))
                .await
                .ok_or(CoreError::StrategyNotFound(strategy_id))?;
            println!("{}", serde_json::to_string_pretty(&strategy).expect("Strategy always serializes"));
        }
        StrategyCommand::Deploy { strategy_id, name, program_file } => {
            let source = std::fs::read_to_string(&program_file)
                .map_err(|e| CoreError::Config(format!("reading {program_file}: {e}")))?;
            let program: StrategyProgram = serde_json::from_str(&source)
                .map_err(|e| CoreError::Config(format!("parsing {program_file}: {e}")))?;

            let id = StrategyId(strategy_id);
            let mut strategy = Strategy::new(id.clone(), name, "launchpad".to_string(), Utc::now());
            strategy.program = Some(program);
            strategy.param_specs = vec![ParamSpec {
                name: "pair".to_string(),
                type_tag: "pair".to_string(),
                default: DEMO_PAIRS[0].0.to_string(),
                description: "target pair".to_string(),
            }];
            host.upsert_strategy(strategy).await;
            host.start(id).await?;
            tracing::info!("strategy deployed and started");
        }
        StrategyCommand::Stop { strategy_id } => {
            host.stop(&StrategyId(strategy_id)).await?;
        }
    }
    store::save(&config.strategy_store_path, &host).await
}

async fn ledger_command(config: Config, command: LedgerCommand) -> Result<(), CoreError> {
    let host = build_host(&config).await?;
    match command {
        LedgerCommand::Performance { strategy_id, range } => {
            let range = parse_range(&range)?;
            let performance = host
                .ledger()
                .performance(&StrategyId(strategy_id), range, Utc::now())
                .await?;
            println!("{}", serde_json::to_string_pretty(&performance).expect("Performance always serializes"));
        }
    }
    Ok(())
}

fn parse_range(raw: &str) -> Result<TimeRange, CoreError> {
    match raw {
        "1h" => Ok(TimeRange::Hour1),
        "4h" => Ok(TimeRange::Hour4),
        "1d" => Ok(TimeRange::Day1),
        "7d" => Ok(TimeRange::Day7),
        "all" => Ok(TimeRange::All),
        other => Err(CoreError::Config(format!("unknown range '{other}', expected 1h|4h|1d|7d|all"))),
    }
}
