use strategy_custody::CustodyError;
use strategy_execution::ExecutorError;
use strategy_ledger::LedgerError;
use strategy_runtime::RuntimeError;
use strategy_types::TypesError;
use thiserror::Error;

/// Top-level error type for the binary: composes every component
/// crate's error enum behind one surface for the CLI to render.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("strategy {0} not found")]
    StrategyNotFound(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error(transparent)]
    Custody(#[from] CustodyError),
    #[error(transparent)]
    Types(#[from] TypesError),
}
