use crate::log::LogBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strategy_ledger::RunId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Lifecycle state of a live Run, spec §4.E.3: "Idle → Running →
/// Sleeping → (Running | Terminated) → Stopped/Errored." `Idle` is never
/// observed in [`LiveRun`] — a `LiveRun` only exists once a strategy has
/// started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLifecycle {
    Running,
    Sleeping,
    Stopped,
    Errored,
}

/// In-memory state the host keeps for one currently-running strategy,
/// spec §4.E "Runtime owns the in-memory live state of each Run (log
/// buffer, next-tick timer, capability binding)." Lost on process
/// restart by design (spec §4.E.3 "at-startup resumption") — only the
/// Ledger's rows survive.
pub struct LiveRun {
    pub run_id: RunId,
    pub logs: Arc<Mutex<LogBuffer>>,
    pub lifecycle: Mutex<RunLifecycle>,
    /// Set by `stop`; checked by the scheduler before arming or firing
    /// the next tick (spec §4.E.3 "cancellation ordering").
    stop_requested: AtomicBool,
    /// The sleep timer for the next tick, held so `stop` can cancel it.
    pub timer: Mutex<Option<JoinHandle<()>>>,
}

impl LiveRun {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            logs: Arc::new(Mutex::new(LogBuffer::new())),
            lifecycle: Mutex::new(RunLifecycle::Running),
            stop_requested: AtomicBool::new(false),
            timer: Mutex::new(None),
        }
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn stop_was_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub async fn set_lifecycle(&self, state: RunLifecycle) {
        *self.lifecycle.lock().await = state;
    }

    pub async fn lifecycle(&self) -> RunLifecycle {
        *self.lifecycle.lock().await
    }

    /// Cancels any armed timer. Idempotent — a `LiveRun` with no timer
    /// set is a no-op, matching `stop`'s idempotence requirement (spec
    /// §8 property 6).
    pub async fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
    }
}
