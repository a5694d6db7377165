use std::sync::Arc;

use tokio::sync::watch;

use crate::foundation::error::{EasingError, EasingResult};

/// Cooperative cancellation token.
///
/// Clones share state. Cancellation is one-way; a token never becomes live again.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a live token.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel every clone of this token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// `Err(EasingError::Aborted)` when cancelled.
    pub fn check(&self) -> EasingResult<()> {
        if self.is_cancelled() {
            Err(EasingError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Resolve once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
