use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use strategy_custody::{CustodyContract, PairMarket};
use strategy_execution::{
    DirectSubmitter, ExecutorConfig, ExecutorError, PairReader, Receipt, TradeExecutor,
    TradeIntent, TxStatus, VenueCredential, VenueKey,
};
use strategy_math::PoolSnapshot;
use strategy_types::{Address, EthAmount, Side, TokenAmount};

fn addr(byte: u8) -> Address {
    format!("0x{:040x}", byte).parse().unwrap()
}

struct FixedReader(PoolSnapshot);

#[async_trait]
impl PairReader for FixedReader {
    async fn reserves(&self, _pair: &Address) -> Result<PoolSnapshot, ExecutorError> {
        Ok(self.0)
    }
}

struct AlwaysSucceedsSubmitter;

#[async_trait]
impl DirectSubmitter for AlwaysSucceedsSubmitter {
    async fn submit_buy(
        &self,
        _pair: &Address,
        _eth_in: EthAmount,
        _min_tokens_out: TokenAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        Ok(Receipt {
            hash: format!("0x{:064x}", 1),
            status: TxStatus::Confirmed,
        })
    }

    async fn submit_sell(
        &self,
        _pair: &Address,
        _token_in: TokenAmount,
        _min_eth_out: EthAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        Ok(Receipt {
            hash: format!("0x{:064x}", 2),
            status: TxStatus::Confirmed,
        })
    }
}

struct RevertingSubmitter;

#[async_trait]
impl DirectSubmitter for RevertingSubmitter {
    async fn submit_buy(
        &self,
        _pair: &Address,
        _eth_in: EthAmount,
        _min_tokens_out: TokenAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        Err(ExecutorError::SlippageExceeded)
    }

    async fn submit_sell(
        &self,
        _pair: &Address,
        _token_in: TokenAmount,
        _min_eth_out: EthAmount,
        _deadline: DateTime<Utc>,
    ) -> Result<Receipt, ExecutorError> {
        Err(ExecutorError::SlippageExceeded)
    }
}

struct AlwaysFillsMarket;

impl PairMarket for AlwaysFillsMarket {
    fn buy(
        &self,
        _pair: &Address,
        eth_in: EthAmount,
        _min_tokens_out: TokenAmount,
    ) -> Result<TokenAmount, strategy_custody::CustodyError> {
        Ok(TokenAmount::from_decimal(eth_in.as_decimal() * dec!(1000)))
    }

    fn sell(
        &self,
        _pair: &Address,
        token_in: TokenAmount,
        _min_eth_out: EthAmount,
    ) -> Result<EthAmount, strategy_custody::CustodyError> {
        Ok(EthAmount::from_decimal(token_in.as_decimal() / dec!(1000)))
    }
}

fn config(dry_run: bool) -> ExecutorConfig {
    ExecutorConfig {
        custody_address: None,
        operator_private_key: None,
        operator_address: None,
        max_eth_per_trade: EthAmount::parse_positive("10").unwrap(),
        default_slippage_bps: 100,
        dry_run,
        receipt_deadline: Duration::from_secs(3600),
    }
}

fn direct_credential() -> VenueCredential {
    VenueCredential {
        key: VenueKey::DirectPrivateKey("0xdeadbeef".into()),
        network_endpoint: "https://example.invalid".into(),
        last_updated: Utc::now(),
    }
}

#[tokio::test]
async fn dry_run_short_circuits_with_zero_hash_and_no_chain_interaction() {
    let reader = Arc::new(FixedReader(PoolSnapshot::new(dec!(1000), dec!(1000000))));
    let direct = Arc::new(RevertingSubmitter);
    let executor = TradeExecutor::new(reader, Some(direct), None, config(true), direct_credential());

    let intent = TradeIntent::new(Side::Buy, addr(9), "0.01".into(), None);
    let receipt = executor.execute(intent, Utc::now()).await.unwrap();
    assert_eq!(receipt.status, TxStatus::Simulated);
    assert_eq!(receipt.hash, format!("0x{}", "0".repeat(64)));
}

#[tokio::test]
async fn direct_mode_buy_submits_with_a_bounded_quote() {
    let reader = Arc::new(FixedReader(PoolSnapshot::new(dec!(1000), dec!(1000000))));
    let direct = Arc::new(AlwaysSucceedsSubmitter);
    let executor = TradeExecutor::new(reader, Some(direct), None, config(false), direct_credential());

    let intent = TradeIntent::new(Side::Buy, addr(9), "0.01".into(), None);
    let receipt = executor.execute(intent, Utc::now()).await.unwrap();
    assert_eq!(receipt.status, TxStatus::Confirmed);
}

#[tokio::test]
async fn slippage_revert_surfaces_as_a_structured_error_with_no_receipt() {
    let reader = Arc::new(FixedReader(PoolSnapshot::new(dec!(1000), dec!(1000000))));
    let direct = Arc::new(RevertingSubmitter);
    let executor = TradeExecutor::new(reader, Some(direct), None, config(false), direct_credential());

    let intent = TradeIntent::new(Side::Buy, addr(9), "1".into(), None);
    let err = executor.execute(intent, Utc::now()).await.unwrap_err();
    assert_eq!(err, ExecutorError::SlippageExceeded);
}

#[tokio::test]
async fn risk_limit_rejects_oversized_buy_before_touching_the_chain() {
    let reader = Arc::new(FixedReader(PoolSnapshot::new(dec!(1000), dec!(1000000))));
    let direct = Arc::new(AlwaysSucceedsSubmitter);
    let executor = TradeExecutor::new(reader, Some(direct), None, config(false), direct_credential());

    let intent = TradeIntent::new(Side::Buy, addr(9), "20".into(), None);
    let err = executor.execute(intent, Utc::now()).await.unwrap_err();
    assert!(matches!(err, ExecutorError::RiskLimitExceeded { .. }));
}

#[tokio::test]
async fn delegate_mode_routes_through_custody_net_of_fee() {
    let user = addr(5);
    let operator = addr(3);
    let owner = addr(1);
    let guardian = addr(2);
    let fee_receiver = addr(4);
    let pair = addr(9);

    let custody = Arc::new(
        CustodyContract::new(owner.clone(), guardian, operator.clone(), fee_receiver, 100, AlwaysFillsMarket)
            .unwrap(),
    );
    custody.allow_pair(&owner, pair.clone()).unwrap();
    custody
        .deposit(&user, EthAmount::parse_positive("1").unwrap(), Utc::now())
        .unwrap();

    let reader = Arc::new(FixedReader(PoolSnapshot::new(dec!(1000), dec!(1000000))));
    let mut cfg = config(false);
    cfg.custody_address = Some(addr(7));
    cfg.operator_private_key = Some("0xoperator".into());
    cfg.operator_address = Some(operator);

    let credential = VenueCredential {
        key: VenueKey::DelegateUser(user.clone()),
        network_endpoint: "https://example.invalid".into(),
        last_updated: Utc::now(),
    };

    let executor = TradeExecutor::new(reader, None, Some(custody.clone()), cfg, credential);
    let intent = TradeIntent::new(Side::Buy, pair, "0.01".into(), Some(user.clone()));
    let receipt = executor.execute(intent, Utc::now()).await.unwrap();
    assert_eq!(receipt.status, TxStatus::Confirmed);

    // user's custody balance decreased by exactly the gross ETH amount.
    assert_eq!(custody.balance_of(&user), EthAmount::parse_positive("0.99").unwrap());
}
