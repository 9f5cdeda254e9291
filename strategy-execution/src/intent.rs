use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use strategy_types::{Address, Side};

/// A strategy's buy/sell intent, spec §4.C: `TradeIntent{side, pair,
/// amount, user?}`. `amount` is kept as a raw string until step 1's
/// validation parses it, since the Capability Surface passes through
/// whatever the strategy program computed.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Serialize, Deserialize)]
pub struct TradeIntent {
    pub side: Side,
    pub pair: Address,
    pub amount: String,
    pub user: Option<Address>,
}

/// Status of a submitted trade, spec §4.C step 2/6.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Simulated,
}

/// The receipt returned to the Capability Surface's `buy`/`sell` calls.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Serialize, Deserialize)]
pub struct Receipt {
    pub hash: String,
    pub status: TxStatus,
}

impl Receipt {
    /// Zero-hash synthetic receipt for the dry-run short-circuit, spec
    /// §4.C step 2 / §8 scenario S4.
    pub fn simulated() -> Self {
        Self {
            hash: format!("0x{}", "0".repeat(64)),
            status: TxStatus::Simulated,
        }
    }
}
