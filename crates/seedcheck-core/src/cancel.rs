//! Cooperative cancellation for a reconciliation run.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable flag that stops a run once raised; every clone observes the same state.
#[derive(Clone, Debug)]
pub struct CancelToken {
    flag: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Raise the flag. Idempotent.
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolve once the flag is raised.
    pub async fn cancelled(&self) {
        let mut receiver = self.flag.subscribe();
        // The sender lives as long as `self`, so the wait only ends on cancellation.
        let _ = receiver.wait_for(|raised| *raised).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
