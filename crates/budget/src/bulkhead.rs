//! Concurrency-limiting gate that rejects immediately when saturated.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A semaphore of size `max_concurrency` with a zero-length queue: a call that
/// cannot acquire a permit immediately is rejected rather than queued.
pub struct Bulkhead {
    semaphore: Arc<Semaphore>,
}

impl Bulkhead {
    #[must_use]
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Attempt to admit one caller. Returns `None` if no permit is free.
    #[must_use]
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).try_acquire_owned().ok()
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
