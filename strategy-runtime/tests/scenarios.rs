use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use strategy_execution::{ExecutorConfig, PairReader, TradeExecutor, VenueCredential, VenueKey};
use strategy_ledger::{Ledger, StrategyId};
use strategy_math::PoolSnapshot;
use strategy_runtime::{
    BalanceReader, BinOp, CoinSort, CoinSummary, Expr, Instruction, ParamSpec, RunLifecycle,
    RuntimeHost, Strategy, StrategyProgram, SubgraphError, SubgraphReader, Value,
};
use strategy_types::{Address, EthAmount, ExecutionMode};
use tokio::time::timeout;

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

fn dry_run_executor() -> Arc<TradeExecutor> {
    let config = ExecutorConfig {
        custody_address: None,
        operator_private_key: None,
        operator_address: None,
        max_eth_per_trade: EthAmount::parse_positive("1").unwrap(),
        default_slippage_bps: 100,
        dry_run: true,
        receipt_deadline: Duration::from_secs(3600),
    };
    Arc::new(TradeExecutor::new(
        Arc::new(FixedReader),
        None,
        None,
        config,
        VenueCredential {
            key: VenueKey::DirectPrivateKey("k".into()),
            network_endpoint: "http://localhost".to_string(),
            last_updated: Utc::now(),
        },
    ))
}

fn host() -> Arc<RuntimeHost> {
    Arc::new(RuntimeHost::new(
        Arc::new(Ledger::new()),
        dry_run_executor(),
        Arc::new(FixedReader),
        Arc::new(EmptySubgraph),
        Arc::new(ZeroBalance),
        addr(9),
        ExecutionMode::Simulated,
        true,
    ))
}

fn strategy_with_program(id: &str, program: StrategyProgram) -> Strategy {
    let mut strategy = Strategy::new(StrategyId(id.to_string()), id.to_string(), "launchpad".to_string(), Utc::now());
    strategy.param_specs = vec![ParamSpec {
        name: "pair".to_string(),
        type_tag: "pair".to_string(),
        default: addr(1).to_string(),
        description: "target pair".to_string(),
    }];
    strategy.program = Some(program);
    strategy
}

/// S1 — clean buy/sell round trip: a program that buys then sells and
/// never calls `schedule` ends the Run after this one tick.
#[tokio::test]
async fn clean_buy_sell_round_trip_ends_the_run_after_one_tick() {
    let host = host();
    let program = StrategyProgram {
        instructions: vec![
            Instruction::Buy {
                pair: Expr::Param("pair".to_string()),
                eth_amount: Expr::Const(Value::Decimal(dec!(0.01))),
            },
            Instruction::Sell {
                pair: Expr::Param("pair".to_string()),
                token_amount: Expr::Const(Value::Decimal(dec!(1))),
            },
        ],
    };
    let strategy_id = StrategyId("s1".to_string());
    host.upsert_strategy(strategy_with_program("s1", program)).await;

    host.start(strategy_id.clone()).await.unwrap();

    let settled = timeout(Duration::from_millis(500), async {
        loop {
            if host.live_lifecycle(&strategy_id).await.is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(settled.is_ok(), "run should stop on its own after the single tick");
}

/// S2 — scheduled tick: a program that only calls `schedule("5m")`
/// leaves the Run sleeping, and `stop` cancels the armed timer.
#[tokio::test]
async fn scheduled_tick_can_be_stopped_while_sleeping() {
    let host = host();
    let program = StrategyProgram {
        instructions: vec![Instruction::Schedule {
            interval: Expr::Const(Value::Str("5m".to_string())),
        }],
    };
    let strategy_id = StrategyId("s2".to_string());
    host.upsert_strategy(strategy_with_program("s2", program)).await;

    host.start(strategy_id.clone()).await.unwrap();

    let reached_sleep = timeout(Duration::from_millis(500), async {
        loop {
            if host.live_lifecycle(&strategy_id).await == Some(RunLifecycle::Sleeping) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached_sleep.is_ok(), "run should be sleeping on its 300s timer");

    host.stop(&strategy_id).await.unwrap();
    assert!(host.live_lifecycle(&strategy_id).await.is_none());

    // stop is idempotent, including on an already-stopped strategy.
    host.stop(&strategy_id).await.unwrap();
}

/// S5 — crash isolation: a failing strategy (division by zero inside its
/// program) ends in `error` without affecting a concurrently running
/// healthy strategy.
#[tokio::test]
async fn a_failing_strategy_does_not_affect_a_healthy_one() {
    let host = host();

    let failing_program = StrategyProgram {
        instructions: vec![Instruction::Log {
            message: Expr::BinOp(
                BinOp::Div,
                Box::new(Expr::Const(Value::Decimal(dec!(1)))),
                Box::new(Expr::Const(Value::Decimal(Decimal::ZERO))),
            ),
        }],
    };
    let healthy_program = StrategyProgram {
        instructions: vec![Instruction::Schedule {
            interval: Expr::Const(Value::Str("5m".to_string())),
        }],
    };

    let failing_id = StrategyId("failing".to_string());
    let healthy_id = StrategyId("healthy".to_string());
    host.upsert_strategy(strategy_with_program("failing", failing_program)).await;
    host.upsert_strategy(strategy_with_program("healthy", healthy_program)).await;

    host.start(failing_id.clone()).await.unwrap();
    host.start(healthy_id.clone()).await.unwrap();

    let failing_ended = timeout(Duration::from_millis(500), async {
        loop {
            if host.live_lifecycle(&failing_id).await.is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(failing_ended.is_ok());

    let failing_strategy = host.get_strategy(&failing_id).await.unwrap();
    assert_eq!(failing_strategy.status, strategy_types::StrategyStatus::Error);

    // the healthy strategy is unaffected: still sleeping on its timer.
    let healthy_still_sleeping = timeout(Duration::from_millis(200), async {
        loop {
            if host.live_lifecycle(&healthy_id).await == Some(RunLifecycle::Sleeping) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(healthy_still_sleeping.is_ok());
    host.stop(&healthy_id).await.unwrap();
}

/// Starting the same strategy twice is rejected (spec §8 property 5).
#[tokio::test]
async fn starting_an_already_running_strategy_is_rejected() {
    let host = host();
    let program = StrategyProgram {
        instructions: vec![Instruction::Schedule {
            interval: Expr::Const(Value::Str("once".to_string())),
        }],
    };
    let strategy_id = StrategyId("dup".to_string());
    host.upsert_strategy(strategy_with_program("dup", program)).await;

    host.start(strategy_id.clone()).await.unwrap();
    let err = host.start(strategy_id.clone()).await.unwrap_err();
    assert!(matches!(err, strategy_runtime::RuntimeError::AlreadyRunning(_)));
    host.stop(&strategy_id).await.unwrap();
}

/// A strategy with no compiled program refuses to start (spec §4.E.3).
#[tokio::test]
async fn starting_a_strategy_with_no_program_is_rejected() {
    let host = host();
    let strategy_id = StrategyId("draft".to_string());
    host.upsert_strategy(Strategy::new(strategy_id.clone(), "draft".to_string(), "launchpad".to_string(), Utc::now()))
        .await;

    let err = host.start(strategy_id).await.unwrap_err();
    assert!(matches!(err, strategy_runtime::RuntimeError::NoSource));
}

/// Spec §8 property 10: an invalid parameter default refuses the start.
#[tokio::test]
async fn invalid_parameter_default_refuses_the_start() {
    let host = host();
    let program = StrategyProgram { instructions: vec![] };
    let mut strategy = strategy_with_program("bad-param", program);
    strategy.param_specs.push(ParamSpec {
        name: "interval".to_string(),
        type_tag: "interval".to_string(),
        default: "2x".to_string(),
        description: String::new(),
    });
    let strategy_id = strategy.id.clone();
    host.upsert_strategy(strategy).await;

    let err = host.start(strategy_id).await.unwrap_err();
    assert!(matches!(err, strategy_runtime::RuntimeError::InvalidParameter { .. }));
}
