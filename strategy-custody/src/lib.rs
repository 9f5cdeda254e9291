//! Custody Contract — Component B of the Strategy Execution Core (spec
//! §4.B): the contract-enforced split between an operator that may trade
//! and a user that may withdraw.

pub mod contract;
pub mod error;
pub mod event;
pub mod pair;

pub use contract::{fee_amount, CustodyContract, FEE_CEILING_BPS};
pub use error::CustodyError;
pub use event::CustodyEvent;
pub use pair::PairMarket;
