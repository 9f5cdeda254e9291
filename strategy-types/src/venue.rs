use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Execution mode for a Run, spec §3 "Run" attribute `execution-mode tag`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Sign and submit transactions directly from a stored private key.
    Direct,
    /// Route through the custody contract's `executeBuy`/`executeSell`.
    Delegate,
    /// Dry-run: no chain interaction, synthetic receipts only.
    Simulated,
}
