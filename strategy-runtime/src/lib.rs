//! Strategy Runtime — Component E of the Strategy Execution Core (spec
//! §4.E): schedules strategies as long-lived cooperative processes,
//! evaluates a declarative strategy program against a capability
//! surface that wires together Pool Math (A), the Trade Executor (C),
//! and the Ledger (D), and carries the per-Run log buffer and lifecycle.

pub mod capability;
pub mod error;
pub mod host;
pub mod log;
pub mod parameter;
pub mod program;
pub mod risk;
pub mod run_state;
pub mod schedule;
pub mod strategy;
pub mod subgraph;

pub use capability::StrategyApi;
pub use error::RuntimeError;
pub use host::RuntimeHost;
pub use log::{LogBuffer, LogLevel, LogLine};
pub use parameter::{coerce, resolve_parameters, ParamSpec, ParamValue};
pub use program::{BinOp, Expr, Instruction, StrategyProgram, Value};
pub use risk::RiskCeilings;
pub use run_state::{LiveRun, RunLifecycle};
pub use schedule::{parse_interval, Schedule};
pub use strategy::{ChatTurn, Strategy};
pub use subgraph::{BalanceReader, CoinSort, CoinSummary, SubgraphError, SubgraphReader};
