//! Broadcast event bus
//!
//! Replaces ambient timers and storage listeners with explicit
//! subscriptions. Dropping a [`Subscription`] unsubscribes it.

use tokio::sync::broadcast;
use tracing::warn;

/// Storage notification published whenever a persisted key is rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    Changed { key: String },
}

/// Multi-subscriber event bus
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: T) -> usize {
        // No subscribers is not an error
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Live subscription to an [`EventBus`]
#[derive(Debug)]
pub struct Subscription<T: Clone> {
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next event. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Subscriber lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Subscriber lagged, skipped {} events", n);
                }
                Err(_) => return None,
            }
        }
    }
}
