//! Shared async plumbing for the Strategy Execution Core: non-blocking
//! channels and concurrency gates, generalized from `jackbot-integration`.

pub mod channel;
pub mod concurrency;

pub use channel::{Channel, ChannelClosed, Tx, UnboundedTx};
pub use concurrency::{ConcurrencyGate, GatePermit, DEFAULT_SUBGRAPH_READ_CAP};
