use derive_more::{Constructor, Display, From};
use serde::{Deserialize, Serialize};

/// Identifier of a persistent Strategy definition, spec §3 "Strategy".
/// Owned by the surrounding application (the Ledger never mints one); a
/// thin newtype keeps run/trade lookups from being stringly typed.
#[derive(
    Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Display, Constructor, From, Serialize, Deserialize,
)]
pub struct StrategyId(pub String);

/// Identifier of a Run, minted by [`crate::Ledger::open_run`].
#[derive(
    Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Display, Constructor, From, Serialize, Deserialize,
)]
pub struct RunId(pub String);
