//! The Ledger — Component D of the Strategy Execution Core (spec §4.D):
//! the persistent record of runs, trades, and FIFO positions, and the
//! aggregation that derives equity curves and summary statistics.

pub mod drawdown;
pub mod error;
pub mod ids;
pub mod model;
pub mod performance;
pub mod position;
pub mod store;

pub use error::LedgerError;
pub use ids::{RunId, StrategyId};
pub use model::{Run, Trade};
pub use performance::{build_performance, EquityPoint, Performance, PerformanceSummary, TimeRange};
pub use position::{Lot, Position};
pub use store::Ledger;
