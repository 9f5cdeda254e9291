//! Shared domain types for the Strategy Execution Core.
//!
//! Generalizes the newtype-and-enum style of `jackbot-instrument` (exchange
//! and instrument identifiers) to this system's domain: on-chain addresses,
//! ETH/token amounts, trade sides, and execution modes.

pub mod address;
pub mod amount;
pub mod error;
pub mod side;
pub mod strategy;
pub mod venue;

pub use address::Address;
pub use amount::{EthAmount, TokenAmount};
pub use error::TypesError;
pub use side::Side;
pub use strategy::StrategyStatus;
pub use venue::ExecutionMode;
