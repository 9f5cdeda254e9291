use crate::ids::{RunId, StrategyId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strategy_types::{Address, EthAmount, ExecutionMode, Side, TokenAmount};

/// A single activation interval of a strategy, spec §3 "Run". At most one
/// Run per strategy has `stop = None` at a time — enforced by
/// [`crate::Ledger::open_run`], not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub strategy_id: StrategyId,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub initial_capital: EthAmount,
    pub mode: ExecutionMode,
    pub user: Option<Address>,
    pub dry_run: bool,
}

impl Run {
    pub fn is_open(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// A single fill inside a Run, spec §3 "Trade". Append-only: once stored,
/// a row's `idx` and `cumulative` never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub run_id: RunId,
    pub idx: u64,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub pair: Address,
    pub eth_amount: EthAmount,
    pub token_amount: TokenAmount,
    /// Realized PnL in ETH. Always zero for buys — a buy is inventory
    /// acquisition, not a P/L event (spec §4.D step 2).
    pub pnl: Decimal,
    /// `100 * pnl / costBasisConsumed`, zero for buys.
    pub pnl_pct: Decimal,
    /// Running sum of `pnl` within this run: `cumulative[i] = cumulative[i-1] + pnl[i]`.
    pub cumulative: Decimal,
    pub tx_hash: String,
}
