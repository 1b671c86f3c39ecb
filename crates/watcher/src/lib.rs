//! Recursive filesystem watch that re-scans configured roots and atomically
//! replaces the registry contents on a debounced quiescence window.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use toolhub_core::{ShutdownHandle, ToolRegistry};
use toolhub_discovery::{scan, CodeToolRegistry, DiscoveryError, ScanRoot};

/// Default debounce window, matching `toolhub-config`'s `WatchSection` default.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Watch every root for filesystem changes, re-scanning and atomically
/// replacing `registry`'s contents after each debounced quiescence window.
///
/// Per-directory scan failures are routed through `on_error`, matching
/// discovery's own `onError` contract. A watcher setup failure (the root
/// doesn't exist, or the OS notifier can't be created) is reported the same
/// way and that root is simply not watched.
pub fn spawn_watcher(
    roots: Vec<ScanRoot>,
    code_registry: Arc<CodeToolRegistry>,
    registry: Arc<RwLock<ToolRegistry>>,
    debounce_ms: u64,
    shutdown: ShutdownHandle,
    mut on_error: impl FnMut(DiscoveryError) + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<notify::Event>>();

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            on_error(DiscoveryError::new(".", format!("failed to create filesystem watcher: {e}")));
            return tokio::spawn(async {});
        }
    };

    for root in &roots {
        let path = Path::new(&root.path);
        if let Err(e) = watcher.watch(path, RecursiveMode::Recursive) {
            on_error(DiscoveryError::new(path, format!("failed to watch root: {e}")));
        }
    }

    let debounce = Duration::from_millis(debounce_ms);

    tokio::spawn(async move {
        // Keep the watcher alive for the task's lifetime; it's dropped (and
        // stops watching) when this task ends.
        let _watcher = watcher;

        loop {
            tokio::select! {
                () = shutdown.wait() => {
                    tracing::debug!("watcher shutting down");
                    break;
                }
                maybe_event = rx.recv() => {
                    let Some(result) = maybe_event else { break };
                    if let Err(e) = result {
                        on_error(DiscoveryError::new(".", format!("filesystem watch error: {e}")));
                        continue;
                    }

                    // Drain further events for the debounce window so a burst
                    // of writes triggers exactly one refresh.
                    loop {
                        tokio::select! {
                            () = tokio::time::sleep(debounce) => break,
                            next = rx.recv() => if next.is_none() { break },
                        }
                    }

                    let specs = scan(&roots, &code_registry, &mut on_error);
                    registry.write().replace_all(specs);
                    tracing::debug!(count = registry.read().len(), "registry refreshed after filesystem change");
                }
            }
        }
    })
}
