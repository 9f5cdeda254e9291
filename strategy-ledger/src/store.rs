use crate::error::LedgerError;
use crate::ids::{RunId, StrategyId};
use crate::model::{Run, Trade};
use crate::performance::{build_performance, Performance, TimeRange};
use crate::position::Position;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use strategy_types::{Address, EthAmount, ExecutionMode, Side, TokenAmount};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    runs: HashMap<RunId, Run>,
    open_run_by_strategy: HashMap<StrategyId, RunId>,
    runs_by_strategy: HashMap<StrategyId, Vec<RunId>>,
    trades_by_run: HashMap<RunId, Vec<Trade>>,
    positions: HashMap<(RunId, Address), Position>,
    next_run_seq: u64,
}

/// The Ledger (spec §4.D): an append-only facade over runs, trades, and
/// FIFO positions, guarded by a single async mutex the way `FakeRedis`
/// guards its map — every write and read goes through one serialization
/// point, which is also what spec §5 assumes of "a single-writer-per-Run
/// discipline already given by serial ticks."
#[derive(Default)]
pub struct Ledger {
    state: Mutex<State>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precondition: no open run for this strategy (spec §4.D).
    pub async fn open_run(
        &self,
        strategy_id: StrategyId,
        initial_capital: EthAmount,
        mode: ExecutionMode,
        user: Option<Address>,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> Result<RunId, LedgerError> {
        let mut state = self.state.lock().await;
        if state.open_run_by_strategy.contains_key(&strategy_id) {
            return Err(LedgerError::RunAlreadyOpen(strategy_id.0));
        }

        let seq = state.next_run_seq;
        state.next_run_seq += 1;
        let run_id = RunId(format!("{}-run-{seq}", strategy_id.0));

        let run = Run {
            id: run_id.clone(),
            strategy_id: strategy_id.clone(),
            started_at: now,
            stopped_at: None,
            initial_capital,
            mode,
            user,
            dry_run,
        };

        state.runs.insert(run_id.clone(), run);
        state.open_run_by_strategy.insert(strategy_id.clone(), run_id.clone());
        state
            .runs_by_strategy
            .entry(strategy_id)
            .or_default()
            .push(run_id.clone());
        state.trades_by_run.insert(run_id.clone(), Vec::new());

        Ok(run_id)
    }

    pub async fn close_run(&self, run_id: &RunId, now: DateTime<Utc>) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let run = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| LedgerError::RunNotFound(run_id.0.clone()))?;
        if !run.is_open() {
            return Err(LedgerError::RunAlreadyClosed(run_id.0.clone()));
        }
        run.stopped_at = Some(now);
        let strategy_id = run.strategy_id.clone();
        state.open_run_by_strategy.remove(&strategy_id);
        Ok(())
    }

    /// Spec §4.D step 2-5: route through the run's FIFO position, price
    /// the fill, and assign the next monotonic index and cumulative.
    pub async fn append_trade(
        &self,
        run_id: &RunId,
        side: Side,
        pair: Address,
        eth_amount: EthAmount,
        token_amount: TokenAmount,
        tx_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Trade, LedgerError> {
        let mut state = self.state.lock().await;
        if !state.runs.contains_key(run_id) {
            return Err(LedgerError::RunNotFound(run_id.0.clone()));
        }

        let position_key = (run_id.clone(), pair.clone());
        let (pnl, pnl_pct) = match side {
            Side::Buy => {
                let position = state.positions.entry(position_key).or_insert_with(Position::new);
                position.push_buy(token_amount, eth_amount);
                (Decimal::ZERO, Decimal::ZERO)
            }
            Side::Sell => {
                let position = state.positions.entry(position_key).or_insert_with(Position::new);
                let cost_basis = position.consume_sell(token_amount).map_err(|available| {
                    LedgerError::InsufficientPosition(
                        run_id.0.clone(),
                        format!("have {available}, need {token_amount}"),
                    )
                })?;
                let pnl = eth_amount.as_decimal() - cost_basis.as_decimal();
                let pnl_pct = if cost_basis.as_decimal() > Decimal::ZERO {
                    pnl / cost_basis.as_decimal() * Decimal::from(100)
                } else {
                    Decimal::ZERO
                };
                (pnl, pnl_pct)
            }
        };

        let trades = state.trades_by_run.entry(run_id.clone()).or_default();
        let idx = trades.len() as u64;
        let last_cumulative = trades.last().map(|t| t.cumulative).unwrap_or(Decimal::ZERO);

        let trade = Trade {
            run_id: run_id.clone(),
            idx,
            timestamp: now,
            side,
            pair,
            eth_amount,
            token_amount,
            pnl,
            pnl_pct,
            cumulative: last_cumulative + pnl,
            tx_hash,
        };
        trades.push(trade.clone());
        Ok(trade)
    }

    pub async fn runs_by_strategy(&self, strategy_id: &StrategyId) -> Vec<Run> {
        let state = self.state.lock().await;
        state
            .runs_by_strategy
            .get(strategy_id)
            .into_iter()
            .flatten()
            .filter_map(|run_id| state.runs.get(run_id).cloned())
            .collect()
    }

    pub async fn trades_by_run(&self, run_id: &RunId) -> Vec<Trade> {
        let state = self.state.lock().await;
        state.trades_by_run.get(run_id).cloned().unwrap_or_default()
    }

    /// Cumulative ETH deployed into buys within this run, feeding the
    /// per-run risk ceiling. Sells return capital, not risk exposure, so
    /// only `Side::Buy` legs count.
    pub async fn run_eth_deployed(&self, run_id: &RunId) -> EthAmount {
        let state = self.state.lock().await;
        state
            .trades_by_run
            .get(run_id)
            .into_iter()
            .flatten()
            .filter(|trade| trade.side == Side::Buy)
            .fold(EthAmount::ZERO, |acc, trade| acc + trade.eth_amount)
    }

    pub async fn run_trade_count(&self, run_id: &RunId) -> u32 {
        let state = self.state.lock().await;
        state.trades_by_run.get(run_id).map(|trades| trades.len() as u32).unwrap_or(0)
    }

    /// Cumulative ETH deployed into buys across every run of this
    /// strategy since `since`, feeding the per-day risk ceiling.
    pub async fn strategy_eth_deployed_since(
        &self,
        strategy_id: &StrategyId,
        since: DateTime<Utc>,
    ) -> EthAmount {
        let state = self.state.lock().await;
        state
            .runs_by_strategy
            .get(strategy_id)
            .into_iter()
            .flatten()
            .filter_map(|run_id| state.trades_by_run.get(run_id))
            .flatten()
            .filter(|trade| trade.side == Side::Buy && trade.timestamp >= since)
            .fold(EthAmount::ZERO, |acc, trade| acc + trade.eth_amount)
    }

    /// Resolves the strategy's active-or-latest run and builds its
    /// bracketed equity curve and summary, spec §4.D / §6.
    pub async fn performance(
        &self,
        strategy_id: &StrategyId,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Performance, LedgerError> {
        let state = self.state.lock().await;
        let run_ids = state
            .runs_by_strategy
            .get(strategy_id)
            .ok_or_else(|| LedgerError::RunNotFound(strategy_id.0.clone()))?;

        let run_id = state
            .open_run_by_strategy
            .get(strategy_id)
            .cloned()
            .or_else(|| {
                run_ids
                    .iter()
                    .max_by_key(|id| state.runs.get(*id).map(|run| run.started_at))
                    .cloned()
            })
            .ok_or_else(|| LedgerError::RunNotFound(strategy_id.0.clone()))?;

        let trades = state.trades_by_run.get(&run_id).cloned().unwrap_or_default();
        Ok(build_performance(&trades, range, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pair(byte: u8) -> Address {
        format!("0x{:040x}", byte).parse().unwrap()
    }

    fn eth(v: &str) -> EthAmount {
        EthAmount::parse_positive(v).unwrap()
    }

    fn tok(v: &str) -> TokenAmount {
        TokenAmount::parse_positive(v).unwrap()
    }

    #[tokio::test]
    async fn second_open_run_for_the_same_strategy_is_rejected() {
        let ledger = Ledger::new();
        let strategy_id = StrategyId("s1".into());
        let now = DateTime::<Utc>::MIN_UTC;

        ledger
            .open_run(strategy_id.clone(), eth("1"), ExecutionMode::Simulated, None, true, now)
            .await
            .unwrap();

        let err = ledger
            .open_run(strategy_id, eth("1"), ExecutionMode::Simulated, None, true, now)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::RunAlreadyOpen(_)));
    }

    #[tokio::test]
    async fn clean_buy_sell_round_trip_closes_flat_with_sell_only_win_rate() {
        let ledger = Ledger::new();
        let strategy_id = StrategyId("s1".into());
        let t0 = DateTime::<Utc>::MIN_UTC;

        let run_id = ledger
            .open_run(strategy_id.clone(), eth("1"), ExecutionMode::Direct, None, false, t0)
            .await
            .unwrap();

        let buy = ledger
            .append_trade(&run_id, Side::Buy, pair(1), eth("0.01"), tok("100"), "0xbuy".into(), t0)
            .await
            .unwrap();
        assert_eq!(buy.idx, 0);
        assert_eq!(buy.pnl, Decimal::ZERO);

        let sell = ledger
            .append_trade(
                &run_id,
                Side::Sell,
                pair(1),
                eth("0.02"),
                tok("100"),
                "0xsell".into(),
                t0 + Duration::seconds(1),
            )
            .await
            .unwrap();
        assert_eq!(sell.idx, 1);
        assert_eq!(sell.pnl.to_string(), "0.01");
        assert_eq!(sell.cumulative, sell.pnl);

        ledger.close_run(&run_id, t0 + Duration::seconds(2)).await.unwrap();

        let runs = ledger.runs_by_strategy(&strategy_id).await;
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].is_open());

        let perf = ledger
            .performance(&strategy_id, TimeRange::All, t0 + Duration::seconds(3))
            .await
            .unwrap();
        assert_eq!(perf.summary.win_rate.to_string(), "100");
    }

    #[tokio::test]
    async fn selling_more_than_is_held_is_rejected() {
        let ledger = Ledger::new();
        let strategy_id = StrategyId("s1".into());
        let t0 = DateTime::<Utc>::MIN_UTC;

        let run_id = ledger
            .open_run(strategy_id, eth("1"), ExecutionMode::Direct, None, false, t0)
            .await
            .unwrap();

        ledger
            .append_trade(&run_id, Side::Buy, pair(1), eth("0.01"), tok("10"), "0xbuy".into(), t0)
            .await
            .unwrap();

        let err = ledger
            .append_trade(&run_id, Side::Sell, pair(1), eth("0.02"), tok("11"), "0xsell".into(), t0)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPosition(_, _)));
    }

    #[tokio::test]
    async fn reopening_a_strategy_after_close_is_allowed() {
        let ledger = Ledger::new();
        let strategy_id = StrategyId("s1".into());
        let t0 = DateTime::<Utc>::MIN_UTC;

        let first = ledger
            .open_run(strategy_id.clone(), eth("1"), ExecutionMode::Direct, None, false, t0)
            .await
            .unwrap();
        ledger.close_run(&first, t0).await.unwrap();

        let second = ledger
            .open_run(strategy_id.clone(), eth("1"), ExecutionMode::Direct, None, false, t0)
            .await
            .unwrap();
        assert_ne!(first, second);

        let runs = ledger.runs_by_strategy(&strategy_id).await;
        assert_eq!(runs.len(), 2);
    }
}
