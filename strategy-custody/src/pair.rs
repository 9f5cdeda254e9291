use crate::error::CustodyError;
use strategy_types::{Address, EthAmount, TokenAmount};

/// The on-chain pair surface the Custody Contract calls into when
/// executing a delegated trade, spec §6 "Pair contract":
/// `buy(minOut) payable`, `sell(tokenIn, minEthOut)`.
///
/// Kept as a trait so the contract's business logic can be exercised in
/// isolation from a live chain client — the same seam
/// `jackbot-execution`'s exchange clients use between a real venue client
/// and a mock one in tests.
pub trait PairMarket {
    fn buy(
        &self,
        pair: &Address,
        eth_in: EthAmount,
        min_tokens_out: TokenAmount,
    ) -> Result<TokenAmount, CustodyError>;

    fn sell(
        &self,
        pair: &Address,
        token_in: TokenAmount,
        min_eth_out: EthAmount,
    ) -> Result<EthAmount, CustodyError>;
}
