//! Adapter for `core`-kind tools: dispatches by `spec.name` to a registered
//! per-name handler (the coreTools built-ins: fs/http/util functions).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use toolhub_core::{ErrorKind, ExecContext, ToolError, ToolKind, ToolSpec};

use crate::AdapterOutput;

/// One coreTools built-in, invoked with its raw args and the caller's context.
#[async_trait]
pub trait CoreHandler: Send + Sync {
    async fn call(&self, args: Value, ctx: &ExecContext) -> Result<AdapterOutput, ToolError>;
}

/// Dispatches by `spec.name` to whichever [`CoreHandler`] is registered under
/// that name. Built from [`toolhub_core_tools`](https://docs.rs/toolhub-core-tools)'s
/// fs/http/util functions by the host at startup.
#[derive(Default)]
pub struct CoreAdapter {
    handlers: HashMap<String, Arc<dyn CoreHandler>>,
}

impl CoreAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn CoreHandler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }
}

#[async_trait]
impl crate::Adapter for CoreAdapter {
    fn kind(&self) -> ToolKind {
        ToolKind::Core
    }

    async fn invoke(&self, spec: &ToolSpec, args: Value, ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let handler = self
            .handlers
            .get(&spec.name)
            .ok_or_else(|| ToolError::new(ErrorKind::ToolNotFound, format!("no core handler registered for '{}'", spec.name)))?;
        handler.call(args, ctx).await
    }
}
