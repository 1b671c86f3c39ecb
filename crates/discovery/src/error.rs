//! The `onError` contract shared by discovery and the watcher.

use std::path::PathBuf;

/// A non-fatal error tied to one directory. Discovery and the watcher both
/// report through this shape rather than aborting a scan.
#[derive(Debug, Clone)]
pub struct DiscoveryError {
    pub dir: PathBuf,
    pub message: String,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.dir.display(), self.message)
    }
}

impl DiscoveryError {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { dir: dir.into(), message: message.into() }
    }
}

/// Callback invoked once per directory that failed to load. Boxed so the
/// scanner can be driven from both a plain closure and a channel sender.
pub type OnError<'a> = dyn FnMut(DiscoveryError) + Send + 'a;
