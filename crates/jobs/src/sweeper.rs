//! Background ticker that evicts terminal jobs once they've outlived their TTL.

use std::sync::Arc;
use std::time::Duration;

use toolhub_core::ShutdownHandle;

use crate::manager::JobManager;

/// Default TTL for a terminal job, in milliseconds (1 hour).
pub const DEFAULT_TTL_MS: u64 = 3_600_000;

/// Sweep interval: `max(ttl/2, 60s)`.
#[must_use]
pub fn sweep_interval(ttl_ms: u64) -> Duration {
    Duration::from_millis((ttl_ms / 2).max(60_000))
}

/// Spawn the periodic sweeper, exiting once `shutdown` fires.
pub fn spawn_sweeper(manager: Arc<JobManager>, ttl_ms: u64, shutdown: ShutdownHandle) -> tokio::task::JoinHandle<()> {
    let interval = sweep_interval(ttl_ms);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = manager.sweep(ttl_ms);
                    if evicted > 0 {
                        tracing::debug!(evicted, "swept terminal jobs past ttl");
                    }
                }
                () = shutdown.wait() => {
                    tracing::debug!("job sweeper shutting down");
                    break;
                }
            }
        }
    })
}
