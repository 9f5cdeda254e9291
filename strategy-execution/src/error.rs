use strategy_custody::CustodyError;
use strategy_math::PoolMathError;
use strategy_types::TypesError;
use thiserror::Error;

/// Errors partitioned per spec §7: Configuration / Policy / on-chain
/// revert / Transport. `Runtime`-class errors (`UserCodeError`) are the
/// Strategy Runtime's concern, not the Executor's.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ExecutorError {
    // --- Configuration: fatal to the operation, no retry -----------------
    #[error("no venue credential configured for this strategy")]
    VenueNotConfigured,
    #[error("delegate mode requires a custody address, operator key, and bound user address")]
    DelegateNotConfigured,
    #[error("malformed address: {0}")]
    BadAddress(String),
    #[error("malformed amount: {0}")]
    BadAmount(String),

    // --- Policy: rejected before submission -------------------------------
    #[error("trade amount {amount} exceeds the configured risk limit {limit}")]
    RiskLimitExceeded { amount: String, limit: String },

    // --- On-chain revert: terminal for this attempt -----------------------
    #[error("slippage bound not met")]
    SlippageExceeded,
    #[error("deadline expired")]
    DeadlineExpired,
    #[error("pair is not allowlisted")]
    PairNotAllowed,
    #[error("custody contract is paused")]
    Paused,
    #[error("insufficient custody balance")]
    InsufficientBalance,
    #[error("reentrant call rejected")]
    Reentrancy,
    #[error("reverted: {0}")]
    Unknown(String),

    // --- Transport: retryable ---------------------------------------------
    #[error("timed out waiting for a receipt")]
    Timeout,
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl ExecutorError {
    /// Whether the user code may reasonably retry this error on the next
    /// scheduled tick, per spec §7's propagation policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::NetworkUnavailable(_))
    }
}

impl From<TypesError> for ExecutorError {
    fn from(value: TypesError) -> Self {
        match value {
            TypesError::BadAddress(s) => Self::BadAddress(s),
            TypesError::BadAmount(s) => Self::BadAmount(s),
        }
    }
}

impl From<PoolMathError> for ExecutorError {
    fn from(value: PoolMathError) -> Self {
        Self::Unknown(value.to_string())
    }
}

impl From<CustodyError> for ExecutorError {
    fn from(value: CustodyError) -> Self {
        match value {
            CustodyError::NotAuthorized => Self::Unknown("custody: not authorized".into()),
            CustodyError::Paused => Self::Paused,
            CustodyError::PairNotAllowed => Self::PairNotAllowed,
            CustodyError::InsufficientBalance => Self::InsufficientBalance,
            CustodyError::DeadlineExpired => Self::DeadlineExpired,
            CustodyError::SlippageExceeded => Self::SlippageExceeded,
            CustodyError::Reentrancy => Self::Reentrancy,
            CustodyError::FeeCeilingExceeded => Self::Unknown("custody: fee ceiling exceeded".into()),
        }
    }
}
