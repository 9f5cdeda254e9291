use crate::subgraph::SubgraphError;
use strategy_execution::ExecutorError;
use strategy_ledger::LedgerError;
use thiserror::Error;

/// Errors reaching the tick boundary, spec §7. Every capability operation
/// and every lifecycle transition returns one of these rather than
/// unwinding — translating the source's "`throw` as the normal failure
/// channel" (spec §9) into an explicit tagged sum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A fault inside the user program itself: a bad parameter reference,
    /// a type mismatch in an expression, or an explicit program failure.
    #[error("user code error: {0}")]
    UserCode(String),

    #[error("subgraph read timed out")]
    SubgraphTimeout,
    #[error("subgraph error: {0}")]
    Subgraph(String),

    #[error("parameter '{name}' is invalid: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("strategy has no deployable program")]
    NoSource,
    #[error("strategy {0} already has an active run")]
    AlreadyRunning(String),
    #[error("strategy {0} has no active run")]
    NotRunning(String),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<SubgraphError> for RuntimeError {
    fn from(err: SubgraphError) -> Self {
        match err {
            SubgraphError::Timeout => Self::SubgraphTimeout,
            SubgraphError::Upstream(msg) => Self::Subgraph(msg),
        }
    }
}

impl From<strategy_math::PoolMathError> for RuntimeError {
    fn from(err: strategy_math::PoolMathError) -> Self {
        Self::Executor(ExecutorError::from(err))
    }
}

impl RuntimeError {
    /// Whether user code may reasonably retry this on the next scheduled
    /// tick, spec §7.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SubgraphTimeout => true,
            Self::Executor(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
