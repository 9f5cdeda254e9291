//! Concurrency gates used by the Strategy Runtime's capability surface
//! (spec §4.E.5): subgraph reads may parallelize up to a configured cap
//! (default 4), while on-chain submissions are capped at one in-flight
//! per strategy. Both are the same primitive — a bounded semaphore —
//! following `jackbot-integration::rate_limit`'s pattern of wrapping a
//! `tokio` sync primitive behind a small typed struct rather than
//! exposing the primitive directly.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default cap on parallel subgraph reads per strategy, spec §4.E.5.
pub const DEFAULT_SUBGRAPH_READ_CAP: usize = 4;

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyGate {
    pub fn new(permits: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// A gate admitting exactly one caller at a time — used for the
    /// single-in-flight-submission rule on on-chain trades.
    pub fn single_flight() -> Self {
        Self::new(1)
    }

    pub fn subgraph_reads() -> Self {
        Self::new(DEFAULT_SUBGRAPH_READ_CAP)
    }

    /// Wait for a permit. The returned guard releases it on drop.
    pub async fn acquire(&self) -> GatePermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("ConcurrencyGate semaphore is never closed");
        GatePermit(permit)
    }
}

#[derive(Debug)]
pub struct GatePermit(#[allow(dead_code)] OwnedSemaphorePermit);
