use crate::capability::StrategyApi;
use crate::error::RuntimeError;
use crate::log::LogLevel;
use crate::parameter::resolve_parameters;
use crate::risk::RiskCeilings;
use crate::run_state::{LiveRun, RunLifecycle};
use crate::schedule::Schedule;
use crate::strategy::Strategy;
use crate::subgraph::{BalanceReader, SubgraphReader};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use strategy_execution::{PairReader, TradeExecutor};
use strategy_ledger::{Ledger, StrategyId};
use strategy_types::{Address, EthAmount, ExecutionMode, StrategyStatus};
use tokio::sync::Mutex;

/// The single process-wide value, spec §9 "Global mutable state": "the
/// dry-run flag, the set of live runs, and the rate-limiter state are
/// process-wide. Encapsulate as an explicit `RuntimeHost` value passed
/// to every start/stop/query operation; the initial call-site in the
/// host process is the only global." Owns the registries; does not own
/// the Ledger's durable rows, only the handle to append to them.
pub struct RuntimeHost {
    strategies: Mutex<HashMap<StrategyId, Strategy>>,
    live_runs: Mutex<HashMap<StrategyId, Arc<LiveRun>>>,
    ledger: Arc<Ledger>,
    executor: Arc<TradeExecutor>,
    reader: Arc<dyn PairReader>,
    subgraph: Arc<dyn SubgraphReader>,
    balances: Arc<dyn BalanceReader>,
    wallet: Address,
    mode: ExecutionMode,
    dry_run: bool,
    risk_ceilings: RiskCeilings,
}

impl RuntimeHost {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<Ledger>,
        executor: Arc<TradeExecutor>,
        reader: Arc<dyn PairReader>,
        subgraph: Arc<dyn SubgraphReader>,
        balances: Arc<dyn BalanceReader>,
        wallet: Address,
        mode: ExecutionMode,
        dry_run: bool,
        risk_ceilings: RiskCeilings,
    ) -> Self {
        Self {
            strategies: Mutex::new(HashMap::new()),
            live_runs: Mutex::new(HashMap::new()),
            ledger,
            executor,
            reader,
            subgraph,
            balances,
            wallet,
            mode,
            dry_run,
            risk_ceilings,
        }
    }

    pub async fn upsert_strategy(&self, strategy: Strategy) {
        self.strategies.lock().await.insert(strategy.id.clone(), strategy);
    }

    pub async fn get_strategy(&self, strategy_id: &StrategyId) -> Option<Strategy> {
        self.strategies.lock().await.get(strategy_id).cloned()
    }

    pub async fn all_strategies(&self) -> Vec<Strategy> {
        self.strategies.lock().await.values().cloned().collect()
    }

    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }

    pub async fn live_lifecycle(&self, strategy_id: &StrategyId) -> Option<RunLifecycle> {
        let live_run = self.live_runs.lock().await.get(strategy_id).cloned()?;
        Some(live_run.lifecycle().await)
    }

    pub async fn live_logs(&self, strategy_id: &StrategyId) -> Option<Vec<crate::log::LogLine>> {
        let live_run = self.live_runs.lock().await.get(strategy_id).cloned()?;
        Some(live_run.logs.lock().await.snapshot())
    }

    /// `start(strategyId)`, spec §4.E.3: validates code presence, opens a
    /// Run, marks the strategy active, and fires the first tick
    /// immediately. Returns once the first tick is scheduled, not once
    /// it has run.
    pub async fn start(self: &Arc<Self>, strategy_id: StrategyId) -> Result<(), RuntimeError> {
        if self.live_runs.lock().await.contains_key(&strategy_id) {
            return Err(RuntimeError::AlreadyRunning(strategy_id.0));
        }

        let mut strategies = self.strategies.lock().await;
        let strategy = strategies
            .get_mut(&strategy_id)
            .ok_or_else(|| RuntimeError::NotRunning(strategy_id.0.clone()))?;
        if strategy.program.is_none() {
            return Err(RuntimeError::NoSource);
        }
        // Fail fast on a bad parameter default/persisted value, spec §8
        // property 10: the run does not start.
        resolve_parameters(&strategy.param_specs, &strategy.param_values)?;
        strategy.status = StrategyStatus::Active;
        drop(strategies);

        let now = Utc::now();
        let run_id = self
            .ledger
            .open_run(strategy_id.clone(), EthAmount::ZERO, self.mode, None, self.dry_run, now)
            .await?;

        let live_run = Arc::new(LiveRun::new(run_id));
        self.live_runs.lock().await.insert(strategy_id.clone(), live_run);

        let host = Arc::clone(self);
        tokio::spawn(async move {
            host.run_tick_chain(strategy_id).await;
        });

        Ok(())
    }

    /// `stop(strategyId)`, spec §4.E.3: idempotent, cancels the armed
    /// timer, closes the Run, marks the strategy paused. A stop on a
    /// never-started strategy is a no-op (spec §8 property 6).
    pub async fn stop(&self, strategy_id: &StrategyId) -> Result<(), RuntimeError> {
        let live_run = self.live_runs.lock().await.get(strategy_id).cloned();
        let Some(live_run) = live_run else {
            return Ok(());
        };
        live_run.request_stop();
        live_run.cancel_timer().await;

        if live_run.lifecycle().await != RunLifecycle::Stopped {
            self.ledger.close_run(&live_run.run_id, Utc::now()).await.ok();
            live_run.set_lifecycle(RunLifecycle::Stopped).await;
        }
        if let Some(mut strategy) = self.strategies.lock().await.get(strategy_id).cloned() {
            strategy.status = StrategyStatus::Paused;
            self.strategies.lock().await.insert(strategy_id.clone(), strategy);
        }
        self.live_runs.lock().await.remove(strategy_id);
        Ok(())
    }

    /// On process boot, spec §4.E.3 "at-startup resumption": `start`
    /// every strategy whose persisted status is `active`.
    pub async fn resume_active_strategies(self: &Arc<Self>) {
        let active: Vec<StrategyId> = self
            .strategies
            .lock()
            .await
            .values()
            .filter(|s| s.status == StrategyStatus::Active)
            .map(|s| s.id.clone())
            .collect();

        for strategy_id in active {
            // Resumption re-validates code/params exactly like a fresh
            // start; a strategy that no longer validates is logged and
            // left paused rather than panicking the whole host.
            if let Err(err) = self.start(strategy_id.clone()).await {
                tracing::warn!(strategy = %strategy_id, error = %err, "failed to resume strategy at startup");
            }
        }
    }

    /// Runs one tick, then either chains the next tick after its
    /// requested interval or ends the Run. Spawned once per Run by
    /// [`Self::start`] — a panic inside this task is caught by tokio at
    /// the task boundary and cannot affect any other strategy's task
    /// (spec §8 scenario S5 "crash isolation").
    async fn run_tick_chain(self: Arc<Self>, strategy_id: StrategyId) {
        let Some(live_run) = self.live_runs.lock().await.get(&strategy_id).cloned() else {
            return;
        };
        if live_run.stop_was_requested() {
            return;
        }

        live_run.set_lifecycle(RunLifecycle::Running).await;
        let outcome = self.run_one_tick(&strategy_id, &live_run).await;

        match outcome {
            Err(err) => {
                live_run
                    .logs
                    .lock()
                    .await
                    .push(Utc::now(), LogLevel::Error, err.to_string());
                self.ledger.close_run(&live_run.run_id, Utc::now()).await.ok();
                live_run.set_lifecycle(RunLifecycle::Errored).await;
                if let Some(mut strategy) = self.strategies.lock().await.get(&strategy_id).cloned() {
                    strategy.status = StrategyStatus::Error;
                    self.strategies.lock().await.insert(strategy_id.clone(), strategy);
                }
                self.live_runs.lock().await.remove(&strategy_id);
            }
            Ok(Some(Schedule::After(delay))) => {
                if live_run.stop_was_requested() {
                    self.close_stopped(&strategy_id, &live_run).await;
                    return;
                }
                live_run.set_lifecycle(RunLifecycle::Sleeping).await;
                let host = Arc::clone(&self);
                let chained_strategy_id = strategy_id.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    host.run_tick_chain(chained_strategy_id).await;
                });
                *live_run.timer.lock().await = Some(handle);
            }
            Ok(Some(Schedule::Once)) | Ok(None) => {
                self.close_stopped(&strategy_id, &live_run).await;
            }
        }
    }

    async fn close_stopped(&self, strategy_id: &StrategyId, live_run: &Arc<LiveRun>) {
        self.ledger.close_run(&live_run.run_id, Utc::now()).await.ok();
        live_run.set_lifecycle(RunLifecycle::Stopped).await;
        if let Some(mut strategy) = self.strategies.lock().await.get(strategy_id).cloned() {
            strategy.status = StrategyStatus::Paused;
            self.strategies.lock().await.insert(strategy_id.clone(), strategy);
        }
        self.live_runs.lock().await.remove(strategy_id);
    }

    async fn run_one_tick(
        &self,
        strategy_id: &StrategyId,
        live_run: &LiveRun,
    ) -> Result<Option<Schedule>, RuntimeError> {
        let strategy = self
            .strategies
            .lock()
            .await
            .get(strategy_id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotRunning(strategy_id.0.clone()))?;
        let program = strategy.program.as_ref().ok_or(RuntimeError::NoSource)?;
        let params = resolve_parameters(&strategy.param_specs, &strategy.param_values)?;

        let api = StrategyApi::new(
            strategy_id.clone(),
            live_run.run_id.clone(),
            None,
            Arc::clone(&self.executor),
            Arc::clone(&self.ledger),
            Arc::clone(&self.reader),
            Arc::clone(&self.subgraph),
            Arc::clone(&self.balances),
            self.wallet.clone(),
            Arc::clone(&live_run.logs),
            self.risk_ceilings,
        );

        program.run(&api, &params).await?;
        Ok(api.take_schedule().await)
    }
}
