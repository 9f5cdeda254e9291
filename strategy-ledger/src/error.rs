use thiserror::Error;

/// Errors surfaced by the Ledger's append and query surface, spec §4.D.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LedgerError {
    #[error("strategy {0} already has an open run")]
    RunAlreadyOpen(String),
    #[error("run {0} not found")]
    RunNotFound(String),
    #[error("run {0} is already closed")]
    RunAlreadyClosed(String),
    #[error("run {0} has no open position to sell {1} tokens against")]
    InsufficientPosition(String, String),
}
