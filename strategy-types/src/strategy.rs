use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a Strategy, spec §3 "Strategy" attribute `status`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Draft,
    Active,
    Paused,
    Error,
}

impl StrategyStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}
