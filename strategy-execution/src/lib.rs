//! Trade Executor — Component C of the Strategy Execution Core (spec
//! §4.C): translates a strategy's buy/sell intent into an on-chain
//! transaction, directly or through the custody contract.

pub mod chain;
pub mod config;
pub mod error;
pub mod executor;
pub mod intent;

pub use chain::{CustodyGateway, DirectSubmitter, PairReader};
pub use config::{ExecutorConfig, VenueCredential, VenueKey};
pub use error::ExecutorError;
pub use executor::{TradeExecutor, TRADE_DEADLINE};
pub use intent::{Receipt, TradeIntent, TxStatus};
