//! Cooperative shutdown signal shared by the runtime, job sweeper, and
//! watcher so none of their background timers block process exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A cloneable handle over one shutdown signal. `trigger` is idempotent;
/// `wait` resolves immediately if shutdown already happened.
#[derive(Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownHandle {
    #[must_use]
    pub fn new() -> Self {
        Self { notify: Arc::new(Notify::new()), triggered: Arc::new(AtomicBool::new(false)) }
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been triggered, now or in the future.
    pub async fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_resolves_immediately_once_already_triggered() {
        let handle = ShutdownHandle::new();
        handle.trigger();
        handle.wait().await;
    }

    #[tokio::test]
    async fn wait_resolves_once_a_clone_triggers() {
        let handle = ShutdownHandle::new();
        let other = handle.clone();
        let waiter = tokio::spawn(async move { handle.wait().await });
        other.trigger();
        waiter.await.unwrap();
    }
}
