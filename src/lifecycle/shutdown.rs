//! Shutdown coordination for the router process.

use tokio::sync::watch;

use crate::lifecycle::cancellation::Cancellation;

/// Coordinator for graceful shutdown.
///
/// Backed by a watch channel so tasks subscribing after the trigger still see
/// it.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Cancellation signal that fires when shutdown is triggered.
    pub fn subscribe(&self) -> Cancellation {
        Cancellation::from_receiver(self.tx.subscribe())
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of live subscribers (requests and tasks still holding a signal).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
