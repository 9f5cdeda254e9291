//! A small declarative interpreter standing in for the source's
//! dynamically evaluated strategy code, spec §9 "Capability surface vs.
//! open runtime". A [`StrategyProgram`] can only ever call through
//! [`crate::capability::StrategyApi`] — there is no expression or
//! instruction that reaches outside it.

pub mod expr;
pub mod instruction;
pub mod program;
pub mod value;

pub use expr::{BinOp, Expr};
pub use instruction::Instruction;
pub use program::StrategyProgram;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::StrategyApi;
    use crate::log::LogBuffer;
    use crate::parameter::ParamValue;
    use crate::subgraph::{BalanceReader, CoinSort, CoinSummary, SubgraphError, SubgraphReader};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use strategy_execution::{ExecutorConfig, PairReader, TradeExecutor, VenueCredential, VenueKey};
    use strategy_ledger::{Ledger, RunId, StrategyId};
    use strategy_math::PoolSnapshot;
    use strategy_types::{Address, EthAmount, ExecutionMode};
    use tokio::sync::Mutex;

    fn addr(byte: u8) -> Address {
        format!("0x{:040x}", byte).parse().unwrap()
    }

    struct FixedReader;

    #[async_trait]
    impl PairReader for FixedReader {
        async fn reserves(&self, _pair: &Address) -> Result<PoolSnapshot, strategy_execution::ExecutorError> {
            Ok(PoolSnapshot::new(dec!(1000), dec!(1_000_000)))
        }
    }

    struct EmptySubgraph;

    #[async_trait]
    impl SubgraphReader for EmptySubgraph {
        async fn list_coins(&self, _sort: CoinSort, _limit: usize) -> Result<Vec<CoinSummary>, SubgraphError> {
            Ok(Vec::new())
        }
        async fn eth_usd_price(&self) -> Result<Decimal, SubgraphError> {
            Ok(dec!(3000))
        }
    }

    struct ZeroBalance;

    #[async_trait]
    impl BalanceReader for ZeroBalance {
        async fn balance_of(&self, _token: &Address, _owner: &Address) -> Result<Decimal, SubgraphError> {
            Ok(Decimal::ZERO)
        }
    }

    async fn dry_run_api() -> (StrategyApi, StrategyId, RunId) {
        let config = ExecutorConfig {
            custody_address: None,
            operator_private_key: None,
            operator_address: None,
            max_eth_per_trade: EthAmount::parse_positive("1").unwrap(),
            default_slippage_bps: 100,
            dry_run: true,
            receipt_deadline: std::time::Duration::from_secs(3600),
        };
        let executor = Arc::new(TradeExecutor::new(
            Arc::new(FixedReader),
            None,
            None,
            config,
            VenueCredential {
                key: VenueKey::DirectPrivateKey("k".into()),
                network_endpoint: "http://localhost".to_string(),
                last_updated: Utc::now(),
            },
        ));
        let ledger = Arc::new(Ledger::new());
        let strategy_id = StrategyId("s1".into());
        let run_id = ledger
            .open_run(strategy_id.clone(), EthAmount::ZERO, ExecutionMode::Simulated, None, true, Utc::now())
            .await
            .unwrap();

        let api = StrategyApi::new(
            strategy_id.clone(),
            run_id.clone(),
            None,
            executor,
            ledger,
            Arc::new(FixedReader),
            Arc::new(EmptySubgraph),
            Arc::new(ZeroBalance),
            addr(9),
            Arc::new(Mutex::new(LogBuffer::new())),
        );
        (api, strategy_id, run_id)
    }

    #[tokio::test]
    async fn buy_then_schedule_arms_the_next_tick() {
        let (api, _strategy_id, _run_id) = dry_run_api().await;
        let program = StrategyProgram {
            instructions: vec![
                Instruction::Buy {
                    pair: Expr::Const(Value::Address(addr(1))),
                    eth_amount: Expr::Const(Value::Decimal(dec!(0.01))),
                },
                Instruction::Schedule { interval: Expr::Const(Value::Str("5m".to_string())) },
            ],
        };

        program.run(&api, &HashMap::new()).await.unwrap();
        let scheduled = api.take_schedule().await;
        assert_eq!(scheduled, Some(crate::schedule::Schedule::After(std::time::Duration::from_secs(300))));
    }

    #[tokio::test]
    async fn if_branch_selects_sell_when_balance_is_positive() {
        let (api, _strategy_id, _run_id) = dry_run_api().await;
        let mut params = HashMap::new();
        params.insert("pair".to_string(), ParamValue::Address(addr(1)));

        let program = StrategyProgram {
            instructions: vec![Instruction::If {
                cond: Expr::BinOp(
                    BinOp::Gt,
                    Box::new(Expr::Balance(Box::new(Expr::Param("pair".to_string())))),
                    Box::new(Expr::Const(Value::Decimal(Decimal::ZERO))),
                ),
                then_branch: vec![Instruction::Sell {
                    pair: Expr::Param("pair".to_string()),
                    token_amount: Expr::Const(Value::Decimal(dec!(1))),
                }],
                else_branch: vec![Instruction::Log { message: Expr::Const(Value::Str("skip".to_string())) }],
            }],
        };

        program.run(&api, &params).await.unwrap();
    }

    #[tokio::test]
    async fn dividing_by_zero_is_a_user_code_error() {
        let (api, _strategy_id, _run_id) = dry_run_api().await;
        let program = StrategyProgram {
            instructions: vec![Instruction::Log {
                message: Expr::BinOp(
                    BinOp::Div,
                    Box::new(Expr::Const(Value::Decimal(dec!(1)))),
                    Box::new(Expr::Const(Value::Decimal(Decimal::ZERO))),
                ),
            }],
        };

        let err = program.run(&api, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, crate::error::RuntimeError::UserCode(_)));
    }
}
