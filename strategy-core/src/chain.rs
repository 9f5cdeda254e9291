//! The concrete chain/subgraph adapter wired into the binary: an
//! in-process `PairMarket` held as shared state rather than a live
//! JSON-RPC client. No `ethers`/`alloy`-class crate appears anywhere in
//! this workspace's own dependency tree (only in unrelated standalone
//! manifests that don't ground anything here), so this stays in the same
//! idiom `strategy-custody`'s own tests already use for `PairMarket` —
//! `AlwaysFillsMarket` generalized from a fixed-rate stub into a real
//! constant-product simulator backed by [`strategy_math`].
//!
//! Swapping this module for a live chain client is the documented
//! extension point (see `DESIGN.md`): every trait it implements is the
//! same one a real RPC-backed adapter would implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use strategy_custody::PairMarket;
use strategy_execution::{DirectSubmitter, ExecutorError, PairReader, Receipt};
use strategy_math::PoolSnapshot;
use strategy_runtime::{BalanceReader, CoinSort, CoinSummary, SubgraphError, SubgraphReader};
use strategy_types::{Address, EthAmount, TokenAmount};

#[derive(Debug, Clone, Copy)]
struct Pool {
    eth_reserve: Decimal,
    token_reserve: Decimal,
    created_at: DateTime<Utc>,
}

struct State {
    pools: HashMap<Address, Pool>,
    balances: HashMap<(Address, Address), Decimal>,
    eth_usd_price: Decimal,
}

/// A single in-process bonding-curve venue: every pair the launchpad
/// lists, one shared constant-product pool each, mutated by every buy
/// and sell that passes through this process.
///
/// Used for `dry_run` as well as any mode this binary runs in, since the
/// workspace carries no real chain client — see the module doc comment.
pub struct SimulatedChain {
    state: Mutex<State>,
}

impl SimulatedChain {
    pub fn new(eth_usd_price: Decimal) -> Self {
        Self {
            state: Mutex::new(State {
                pools: HashMap::new(),
                balances: HashMap::new(),
                eth_usd_price,
            }),
        }
    }

    /// Seeds a pair with initial reserves; used by `strategy list` demo
    /// data and by operators wiring up a freshly-launched pair.
    pub async fn seed_pair(&self, pair: Address, eth_reserve: Decimal, token_reserve: Decimal, now: DateTime<Utc>) {
        self.state.lock().pools.insert(
            pair,
            Pool {
                eth_reserve,
                token_reserve,
                created_at: now,
            },
        );
    }

    pub async fn credit(&self, token: Address, owner: Address, amount: Decimal) {
        *self.state.lock().balances.entry((token, owner)).or_default() += amount;
    }
}

#[async_trait]
impl PairReader for SimulatedChain {
    async fn reserves(&self, pair: &Address) -> Result<PoolSnapshot, ExecutorError> {
        let state = self.state.lock();
        let pool = state
            .pools
            .get(pair)
            .ok_or_else(|| ExecutorError::Unknown(format!("pair {pair} has no seeded reserves")))?;
        Ok(PoolSnapshot::new(pool.eth_reserve, pool.token_reserve))
    }
}

impl PairMarket for SimulatedChain {
    fn buy(
        &self,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
    ) -> Result<TokenAmount, strategy_custody::CustodyError> {
        let mut state = self.state.lock();
        let pool = state
            .pools
            .get(pair)
            .copied()
            .ok_or(strategy_custody::CustodyError::PairNotAllowed)?;
        let reserves = PoolSnapshot::new(pool.eth_reserve, pool.token_reserve);
        let quote = strategy_math::buy_quote(&reserves, eth_in.as_decimal(), 0)
            .map_err(|_| strategy_custody::CustodyError::SlippageExceeded)?;
        if quote.expected_out < min_tokens_out.as_decimal() {
            return Err(strategy_custody::CustodyError::SlippageExceeded);
        }
        let pool = state.pools.get_mut(pair).expect("checked above");
        pool.eth_reserve += eth_in.as_decimal();
        pool.token_reserve -= quote.expected_out;
        Ok(TokenAmount::from_decimal(quote.expected_out))
    }

    fn sell(
        &self,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
    ) -> Result<EthAmount, strategy_custody::CustodyError> {
        let mut state = self.state.lock();
        let pool = state
            .pools
            .get(pair)
            .copied()
            .ok_or(strategy_custody::CustodyError::PairNotAllowed)?;
        let reserves = PoolSnapshot::new(pool.eth_reserve, pool.token_reserve);
        let quote = strategy_math::sell_quote(&reserves, token_in.as_decimal(), 0)
            .map_err(|_| strategy_custody::CustodyError::SlippageExceeded)?;
        if quote.expected_out < min_eth_out.as_decimal() {
            return Err(strategy_custody::CustodyError::SlippageExceeded);
        }
        let pool = state.pools.get_mut(pair).expect("checked above");
        pool.token_reserve += token_in.as_decimal();
        pool.eth_reserve -= quote.expected_out;
        Ok(EthAmount::from_decimal(quote.expected_out))
    }
}

#[async_trait]
impl DirectSubmitter for SimulatedChain {
    async fn submit_buy(
        &self,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        let tokens_out = PairMarket::buy(self, pair, eth_in, min_tokens_out)?;
        Ok(confirmed_receipt(&format!("buy:{pair}:{tokens_out}")))
    }

    async fn submit_sell(
        &self,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        let eth_out = PairMarket::sell(self, pair, token_in, min_eth_out)?;
        Ok(confirmed_receipt(&format!("sell:{pair}:{eth_out}")))
    }
}

fn confirmed_receipt(seed: &str) -> Receipt {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    Receipt::new(format!("0x{:064x}", hasher.finish()), strategy_execution::TxStatus::Confirmed)
}

#[async_trait]
impl SubgraphReader for SimulatedChain {
    async fn list_coins(&self, sort: CoinSort, limit: usize) -> Result<Vec<CoinSummary>, SubgraphError> {
        let state = self.state.lock();
        let mut coins: Vec<CoinSummary> = state
            .pools
            .iter()
            .map(|(pair, pool)| CoinSummary {
                pair: pair.clone(),
                token: pair.clone(),
                created_at: pool.created_at,
                eth_reserve: pool.eth_reserve,
                token_reserve: pool.token_reserve,
            })
            .collect();
        match sort {
            CoinSort::Newest => coins.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            CoinSort::MarketCap => coins.sort_by(|a, b| {
                let a_cap = a.eth_reserve * state.eth_usd_price;
                let b_cap = b.eth_reserve * state.eth_usd_price;
                b_cap.cmp(&a_cap)
            }),
        }
        coins.truncate(limit);
        Ok(coins)
    }

    async fn eth_usd_price(&self) -> Result<Decimal, SubgraphError> {
        Ok(self.state.lock().eth_usd_price)
    }
}

#[async_trait]
impl BalanceReader for SimulatedChain {
    async fn balance_of(&self, token: &Address, owner: &Address) -> Result<Decimal, SubgraphError> {
        let state = self.state.lock();
        Ok(state.balances.get(&(token.clone(), owner.clone())).copied().unwrap_or(Decimal::ZERO))
    }
}

pub fn shared(eth_usd_price: Decimal) -> Arc<SimulatedChain> {
    Arc::new(SimulatedChain::new(eth_usd_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> Address {
        "0x0000000000000000000000000000000000000009".parse().unwrap()
    }

    #[tokio::test]
    async fn buy_then_sell_round_trips_reserves_in_the_same_direction() {
        let chain = SimulatedChain::new(dec!(3000));
        chain.seed_pair(pair(), dec!(1000), dec!(1_000_000), Utc::now()).await;

        let before = PairReader::reserves(&chain, &pair()).await.unwrap();
        let tokens_out = PairMarket::buy(
            &chain,
            &pair(),
            EthAmount::parse_positive("1").unwrap(),
            TokenAmount::ZERO,
        )
        .unwrap();
        assert!(tokens_out > TokenAmount::ZERO);

        let after = PairReader::reserves(&chain, &pair()).await.unwrap();
        assert!(after.eth_reserve > before.eth_reserve);
        assert!(after.token_reserve < before.token_reserve);

        let eth_out = PairMarket::sell(&chain, &pair(), tokens_out, EthAmount::ZERO).unwrap();
        assert!(eth_out > EthAmount::ZERO);
    }

    #[test]
    fn buy_against_an_unlisted_pair_is_rejected() {
        let chain = SimulatedChain::new(dec!(3000));
        let result = PairMarket::buy(&chain, &pair(), EthAmount::parse_positive("1").unwrap(), TokenAmount::ZERO);
        assert_eq!(result, Err(strategy_custody::CustodyError::PairNotAllowed));
    }

    #[tokio::test]
    async fn list_coins_sorted_by_market_cap_puts_the_larger_reserve_first() {
        let chain = SimulatedChain::new(dec!(3000));
        let small = "0x0000000000000000000000000000000000000001".parse::<Address>().unwrap();
        let large = "0x0000000000000000000000000000000000000002".parse::<Address>().unwrap();
        chain.seed_pair(small.clone(), dec!(10), dec!(1_000_000), Utc::now()).await;
        chain.seed_pair(large.clone(), dec!(500), dec!(1_000_000), Utc::now()).await;

        let coins = chain.list_coins(CoinSort::MarketCap, 10).await.unwrap();
        assert_eq!(coins[0].pair, large);
        assert_eq!(coins[1].pair, small);
    }

    #[tokio::test]
    async fn credited_balance_is_readable_back() {
        let chain = SimulatedChain::new(dec!(3000));
        let token = pair();
        let owner = "0x0000000000000000000000000000000000000001".parse::<Address>().unwrap();
        chain.credit(token.clone(), owner.clone(), dec!(42)).await;
        assert_eq!(BalanceReader::balance_of(&chain, &token, &owner).await.unwrap(), dec!(42));
    }
}
