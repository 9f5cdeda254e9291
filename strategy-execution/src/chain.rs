use crate::error::ExecutorError;
use crate::intent::Receipt;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use strategy_math::PoolSnapshot;
use strategy_types::{Address, EthAmount, TokenAmount};

/// Reads `(ethReserve, tokenReserve)` from a pair, spec §6 "Pair
/// contract". Used regardless of execution mode — both direct and
/// delegate submission need a fresh quote against the same pair.
#[async_trait]
pub trait PairReader: Send + Sync {
    async fn reserves(&self, pair: &Address) -> Result<PoolSnapshot, ExecutorError>;
}

/// Signs and submits a transaction directly to the pair from a stored
/// private key, spec §4.C step 5 "Direct".
#[async_trait]
pub trait DirectSubmitter: Send + Sync {
    async fn submit_buy(
        &self,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
        deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError>;

    async fn submit_sell(
        &self,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
        deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError>;
}

/// The operator-facing surface of the Custody Contract (spec §4.B),
/// narrowed to what the Trade Executor needs for delegate-mode
/// submission. Implemented for `strategy_custody::CustodyContract<M>` via
/// a blanket impl so the executor never depends on the contract's
/// concrete `PairMarket` type parameter.
pub trait CustodyGateway: Send + Sync {
    fn fee_bps(&self) -> u32;

    fn execute_buy(
        &self,
        operator: &Address,
        user: &Address,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<TokenAmount, ExecutorError>;

    fn execute_sell(
        &self,
        operator: &Address,
        user: &Address,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<EthAmount, ExecutorError>;
}

impl<M> CustodyGateway for strategy_custody::CustodyContract<M>
where
    M: strategy_custody::PairMarket + Send + Sync,
{
    fn fee_bps(&self) -> u32 {
        self.fee_bps()
    }

    fn execute_buy(
        &self,
        operator: &Address,
        user: &Address,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<TokenAmount, ExecutorError> {
        Ok(self.execute_buy(operator, user, pair, eth_in, min_tokens_out, deadline, now)?)
    }

    fn execute_sell(
        &self,
        operator: &Address,
        user: &Address,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<EthAmount, ExecutorError> {
        Ok(self.execute_sell(operator, user, pair, token_in, min_eth_out, deadline, now)?)
    }
}
