use thiserror::Error;

/// Failure signals from the Custody Contract, spec §4.B "Failure signals".
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CustodyError {
    #[error("caller is not authorized to perform this action")]
    NotAuthorized,
    #[error("contract is paused")]
    Paused,
    #[error("pair is not allowlisted")]
    PairNotAllowed,
    #[error("depositor balance is insufficient")]
    InsufficientBalance,
    #[error("deadline has expired")]
    DeadlineExpired,
    #[error("trade would have reverted: slippage bound not met")]
    SlippageExceeded,
    #[error("reentrant call rejected")]
    Reentrancy,
    #[error("fee exceeds the 1000 bps ceiling")]
    FeeCeilingExceeded,
}
