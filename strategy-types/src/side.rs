use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The side of a [`Trade`](crate) — spec §3 "Trade" attribute `side`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}
