use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strategy_types::{Address, EthAmount, TokenAmount};

/// Contract events, spec §6 "admin and events". Kept as an in-memory log
/// rather than a chain log, since this crate models the contract's
/// business logic rather than its bytecode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CustodyEvent {
    Deposited {
        at: DateTime<Utc>,
        depositor: Address,
        amount: EthAmount,
    },
    Withdrawn {
        at: DateTime<Utc>,
        depositor: Address,
        amount: EthAmount,
    },
    BuyExecuted {
        at: DateTime<Utc>,
        user: Address,
        pair: Address,
        eth_in: EthAmount,
        tokens_out: TokenAmount,
        fee: EthAmount,
    },
    SellExecuted {
        at: DateTime<Utc>,
        user: Address,
        pair: Address,
        token_in: TokenAmount,
        eth_out: EthAmount,
        fee: EthAmount,
    },
    Paused { at: DateTime<Utc> },
    Unpaused { at: DateTime<Utc> },
    OperatorChanged { at: DateTime<Utc>, operator: Address },
    FeeChanged { at: DateTime<Utc>, fee_bps: u32 },
}
