use crate::error::RuntimeError;
use crate::log::{LogBuffer, LogLevel};
use crate::risk::RiskCeilings;
use crate::schedule::Schedule;
use crate::subgraph::{BalanceReader, CoinSort, CoinSummary, SubgraphReader};
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use strategy_execution::{ExecutorError, PairReader, Receipt, TradeExecutor, TradeIntent};
use strategy_integration::ConcurrencyGate;
use strategy_ledger::{Ledger, RunId, StrategyId};
use strategy_types::{Address, Side};
use tokio::sync::Mutex;

/// Rolling window the per-day risk ceiling is measured over — the most
/// recent 24 hours, not the calendar day, so it has no reset-at-midnight
/// edge to game.
const RISK_DAY_WINDOW: ChronoDuration = ChronoDuration::hours(24);

/// The one object a running strategy's code ever touches, spec §4.E.1.
/// Every method here is a capability operation; there is no other way
/// for a strategy program to reach the Executor, the Ledger, or the
/// chain. Held by a Run, not by the Runtime host itself, which is how
/// §9's "cyclic references" note is broken in practice: the capability
/// references a narrow `Arc<Ledger>` append surface and its own
/// `RunId`, never the host's registry of all runs.
pub struct StrategyApi {
    strategy_id: StrategyId,
    run_id: RunId,
    user: Option<Address>,
    executor: Arc<TradeExecutor>,
    ledger: Arc<Ledger>,
    reader: Arc<dyn PairReader>,
    subgraph: Arc<dyn SubgraphReader>,
    balances: Arc<dyn BalanceReader>,
    wallet: Address,
    chain_gate: ConcurrencyGate,
    subgraph_gate: ConcurrencyGate,
    logs: Arc<Mutex<LogBuffer>>,
    next_schedule: Mutex<Option<Schedule>>,
    risk_ceilings: RiskCeilings,
}

impl StrategyApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        strategy_id: StrategyId,
        run_id: RunId,
        user: Option<Address>,
        executor: Arc<TradeExecutor>,
        ledger: Arc<Ledger>,
        reader: Arc<dyn PairReader>,
        subgraph: Arc<dyn SubgraphReader>,
        balances: Arc<dyn BalanceReader>,
        wallet: Address,
        logs: Arc<Mutex<LogBuffer>>,
        risk_ceilings: RiskCeilings,
    ) -> Self {
        Self {
            strategy_id,
            run_id,
            user,
            executor,
            ledger,
            reader,
            subgraph,
            balances,
            wallet,
            chain_gate: ConcurrencyGate::single_flight(),
            subgraph_gate: ConcurrencyGate::subgraph_reads(),
            logs,
            next_schedule: Mutex::new(None),
            risk_ceilings,
        }
    }

    pub async fn list_coins(&self, sort: CoinSort, limit: usize) -> Result<Vec<CoinSummary>, RuntimeError> {
        let _permit = self.subgraph_gate.acquire().await;
        Ok(self.subgraph.list_coins(sort, limit).await?)
    }

    pub async fn get_price(&self, pair: &Address) -> Result<Decimal, RuntimeError> {
        let _permit = self.subgraph_gate.acquire().await;
        let reserves = self.reader.reserves(pair).await?;
        if reserves.token_reserve <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        Ok(reserves.eth_reserve / reserves.token_reserve)
    }

    /// `ethCollected * ethUsd`, spec §9 open question: the source's
    /// extra `× 100` factor is dropped as unjustified.
    pub async fn get_market_cap(&self, pair: &Address) -> Result<Decimal, RuntimeError> {
        let _permit = self.subgraph_gate.acquire().await;
        let reserves = self.reader.reserves(pair).await?;
        let eth_usd = self.subgraph.eth_usd_price().await?;
        Ok(reserves.eth_reserve * eth_usd)
    }

    pub async fn get_balance(&self, token: &Address) -> Result<Decimal, RuntimeError> {
        let _permit = self.subgraph_gate.acquire().await;
        Ok(self.balances.balance_of(token, &self.wallet).await?)
    }

    pub async fn buy(&self, pair: &Address, eth_amount: Decimal) -> Result<Receipt, RuntimeError> {
        self.trade(Side::Buy, pair, eth_amount).await
    }

    pub async fn sell(&self, pair: &Address, token_amount: Decimal) -> Result<Receipt, RuntimeError> {
        self.trade(Side::Sell, pair, token_amount).await
    }

    async fn trade(&self, side: Side, pair: &Address, amount: Decimal) -> Result<Receipt, RuntimeError> {
        let _permit = self.chain_gate.acquire().await;
        let now = Utc::now();
        self.check_risk_ceilings(side, amount, now).await?;
        let intent = TradeIntent::new(side, pair.clone(), amount.normalize().to_string(), self.user.clone());
        let receipt = self.executor.execute(intent, now).await?;

        if receipt.status != strategy_execution::TxStatus::Simulated {
            let (eth_amount, token_amount) = self.settlement_amounts(side, pair, amount).await?;
            self.ledger
                .append_trade(&self.run_id, side, pair.clone(), eth_amount, token_amount, receipt.hash.clone(), now)
                .await?;
            self.log(
                LogLevel::Trade,
                format!("{side} {pair} amount={amount} tx={}", receipt.hash),
            )
            .await;
        }

        Ok(receipt)
    }

    /// Enforces the risk ceilings layered above the Executor's own
    /// per-trade cap: a trade-count cap for either side, and ETH-deployed
    /// caps (per run, per rolling day) for buys only — sells return
    /// capital rather than deploying it, mirroring the Executor's own
    /// `max_eth_per_trade` check, which is also buy-only.
    async fn check_risk_ceilings(&self, side: Side, amount: Decimal, now: chrono::DateTime<Utc>) -> Result<(), RuntimeError> {
        let trade_count = self.ledger.run_trade_count(&self.run_id).await;
        if trade_count >= self.risk_ceilings.max_trades_per_run {
            return Err(RuntimeError::Executor(ExecutorError::RiskLimitExceeded {
                amount: format!("{} trades", trade_count + 1),
                limit: format!("{} trades per run", self.risk_ceilings.max_trades_per_run),
            }));
        }

        if side == Side::Buy {
            let deployed_in_run = self.ledger.run_eth_deployed(&self.run_id).await.as_decimal();
            let projected_run = deployed_in_run + amount;
            if projected_run > self.risk_ceilings.max_eth_per_run {
                return Err(RuntimeError::Executor(ExecutorError::RiskLimitExceeded {
                    amount: projected_run.to_string(),
                    limit: self.risk_ceilings.max_eth_per_run.to_string(),
                }));
            }

            let deployed_today = self
                .ledger
                .strategy_eth_deployed_since(&self.strategy_id, now - RISK_DAY_WINDOW)
                .await
                .as_decimal();
            let projected_day = deployed_today + amount;
            if projected_day > self.risk_ceilings.max_eth_per_day {
                return Err(RuntimeError::Executor(ExecutorError::RiskLimitExceeded {
                    amount: projected_day.to_string(),
                    limit: self.risk_ceilings.max_eth_per_day.to_string(),
                }));
            }
        }

        Ok(())
    }

    /// The Receipt carries only `{hash, status}` (spec §4.C) — no
    /// realized fill quantity. The capability surface recomputes the
    /// expected fill against a fresh quote (zero slippage) from the same
    /// [`PairReader`] the Executor used, which is exact for the common
    /// case and only diverges from the true on-chain fill by whatever
    /// slippage occurred between the Executor's quote and this one.
    async fn settlement_amounts(
        &self,
        side: Side,
        pair: &Address,
        amount: Decimal,
    ) -> Result<(strategy_types::EthAmount, strategy_types::TokenAmount), RuntimeError> {
        use strategy_types::{EthAmount, TokenAmount};

        let reserves = self.reader.reserves(pair).await?;
        match side {
            Side::Buy => {
                let quote = strategy_math::buy_quote(&reserves, amount, 0)?;
                Ok((EthAmount::from_decimal(amount), TokenAmount::from_decimal(quote.expected_out)))
            }
            Side::Sell => {
                let quote = strategy_math::sell_quote(&reserves, amount, 0)?;
                Ok((EthAmount::from_decimal(quote.expected_out), TokenAmount::from_decimal(amount)))
            }
        }
    }

    pub async fn log(&self, level: LogLevel, message: impl Into<String>) {
        let mut logs = self.logs.lock().await;
        logs.push(Utc::now(), level, message);
    }

    /// Arms the next tick, spec §4.E.1/§4.E.3. Overwrites any earlier
    /// call within the same tick — only the last `schedule` wins.
    pub async fn schedule(&self, interval: Schedule) {
        *self.next_schedule.lock().await = Some(interval);
    }

    /// Consumed once per tick by the host after the user program returns.
    pub async fn take_schedule(&self) -> Option<Schedule> {
        self.next_schedule.lock().await.take()
    }

    pub fn strategy_id(&self) -> &StrategyId {
        &self.strategy_id
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}
