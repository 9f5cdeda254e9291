//! Lightweight typed wrapper over an unbounded mpsc channel, generalized
//! from `jackbot-integration`'s `Tx`/`Channel` pattern. Used by the Strategy
//! Runtime so the capability surface's `log()` call (spec §4.E.1) never
//! blocks the tick, and so the tick scheduler can wake a sleeping Run.

use std::fmt::Debug;

/// A non-blocking, cloneable send half of an unbounded channel.
pub trait Tx
where
    Self: Debug + Clone + Send,
{
    type Item;

    /// Enqueue an item. Never blocks; the only failure mode is the
    /// receiver having been dropped (the Run has already ended).
    fn send<Item: Into<Self::Item>>(&self, item: Item) -> Result<(), ChannelClosed>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("channel receiver has been dropped")]
pub struct ChannelClosed;

#[derive(Debug)]
pub struct Channel<T> {
    pub tx: UnboundedTx<T>,
    pub rx: tokio::sync::mpsc::UnboundedReceiver<T>,
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            tx: UnboundedTx { tx },
            rx,
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct UnboundedTx<T> {
    tx: tokio::sync::mpsc::UnboundedSender<T>,
}

impl<T> Tx for UnboundedTx<T>
where
    T: Debug + Clone + Send,
{
    type Item = T;

    fn send<Item: Into<Self::Item>>(&self, item: Item) -> Result<(), ChannelClosed> {
        self.tx.send(item.into()).map_err(|_| ChannelClosed)
    }
}
