use clap::{Parser, Subcommand};

/// Strategy Execution Core — schedules bonding-curve launchpad trading
/// strategies and keeps their run/trade ledger.
#[derive(Debug, Parser)]
#[command(name = "strategy-core", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the host, resume every previously-active strategy, and
    /// serve until SIGINT/SIGTERM.
    Run,
    /// Strategy bookkeeping.
    Strategy {
        #[command(subcommand)]
        command: StrategyCommand,
    },
    /// Ledger queries.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum StrategyCommand {
    /// List every known strategy and its status.
    List,
    /// Show one strategy's full definition.
    Show { strategy_id: String },
    /// Register a strategy from a JSON `StrategyProgram` file and start it.
    Deploy {
        strategy_id: String,
        name: String,
        #[arg(long)]
        program_file: String,
    },
    /// Stop a running strategy.
    Stop { strategy_id: String },
}

#[derive(Debug, Subcommand)]
pub enum LedgerCommand {
    /// Print the equity curve and summary statistics for a strategy.
    Performance {
        strategy_id: String,
        #[arg(long, default_value = "all")]
        range: String,
    },
}
