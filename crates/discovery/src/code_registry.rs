//! Rust-native stand-in for the source ecosystem's dynamic "JS-entry" code
//! loading: there is no safe equivalent of `require()`-ing an arbitrary file
//! at runtime, so code tools are instead registered ahead of time by the
//! host under a key, and discovery's code loader resolves `entry.toml`'s
//! `key` field against this registry.

use std::collections::HashMap;
use std::sync::Arc;

use toolhub_core::Invoker;

/// Maps an entry key (as named by a directory's `entry.toml`) to a
/// constructed [`Invoker`]. Populated by the embedding application before
/// discovery runs; entries not found here become a per-directory load error.
#[derive(Default, Clone)]
pub struct CodeToolRegistry {
    builders: HashMap<String, Arc<dyn Invoker>>,
}

impl std::fmt::Debug for CodeToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeToolRegistry").field("keys", &self.builders.keys().collect::<Vec<_>>()).finish()
    }
}

impl CodeToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, invoker: Arc<dyn Invoker>) {
        self.builders.insert(key.into(), invoker);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<dyn Invoker>> {
        self.builders.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::future::Future;
    use std::pin::Pin;

    #[derive(Debug)]
    struct Echo;
    impl Invoker for Echo {
        fn invoke<'a>(&'a self, args: Value) -> Pin<Box<dyn Future<Output = Result<Value, toolhub_core::ToolError>> + Send + 'a>> {
            Box::pin(async move { Ok(args) })
        }
    }

    #[test]
    fn registers_and_resolves_by_key() {
        let mut registry = CodeToolRegistry::new();
        registry.register("echo", Arc::new(Echo));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }
}
