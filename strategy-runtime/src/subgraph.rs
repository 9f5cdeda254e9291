use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strategy_types::Address;

/// Ranking requested by `listCoins({sort, limit})`, spec §4.E.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoinSort {
    Newest,
    MarketCap,
}

/// One row of the subgraph's list-coins response, spec §6 "Subgraph read
/// surface".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub pair: Address,
    pub token: Address,
    pub created_at: DateTime<Utc>,
    pub eth_reserve: Decimal,
    pub token_reserve: Decimal,
}

/// The read-only external data source backing `listCoins`/`getMarketCap`,
/// spec §6 "Subgraph read surface (consumed by the runtime)". Kept as its
/// own trait (rather than folded into [`strategy_execution::PairReader`])
/// because it is a distinct upstream service in production: an indexer,
/// not the chain itself.
#[async_trait]
pub trait SubgraphReader: Send + Sync {
    async fn list_coins(&self, sort: CoinSort, limit: usize) -> Result<Vec<CoinSummary>, SubgraphError>;

    /// Current ETH/USD price, spec §4.E.1 `getMarketCap`.
    async fn eth_usd_price(&self) -> Result<Decimal, SubgraphError>;
}

/// Live on-chain balance of the configured wallet, spec §4.E.1
/// `getBalance(token)`. Separate from [`SubgraphReader`] because it reads
/// the chain directly, not the indexer.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn balance_of(&self, token: &Address, owner: &Address) -> Result<Decimal, SubgraphError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubgraphError {
    #[error("subgraph read timed out")]
    Timeout,
    #[error("subgraph error: {0}")]
    Upstream(String),
}
