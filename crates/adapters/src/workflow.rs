//! Adapter for `workflow`-kind tools: delegates to an external workflow runner.

use async_trait::async_trait;
use serde_json::Value;
use toolhub_core::{ErrorKind, ExecContext, ToolError, ToolKind, ToolSpec};

use crate::AdapterOutput;

/// Executes a declared workflow graph. No in-process workflow engine is part
/// of this crate; a real host wires one in.
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    async fn run(&self, spec: &ToolSpec, args: Value, ctx: &ExecContext) -> Result<Value, ToolError>;
}

/// Runner used until a host wires a real engine: every invocation fails with
/// `UPSTREAM_ERROR` naming the unrun workflow.
#[derive(Debug, Default)]
pub struct NoopWorkflowRunner;

#[async_trait]
impl WorkflowRunner for NoopWorkflowRunner {
    async fn run(&self, spec: &ToolSpec, _args: Value, _ctx: &ExecContext) -> Result<Value, ToolError> {
        Err(ToolError::new(ErrorKind::UpstreamError, format!("no workflow runner configured to run '{}'", spec.name)))
    }
}

pub struct WorkflowAdapter {
    runner: std::sync::Arc<dyn WorkflowRunner>,
}

impl WorkflowAdapter {
    #[must_use]
    pub fn new(runner: std::sync::Arc<dyn WorkflowRunner>) -> Self {
        Self { runner }
    }
}

impl Default for WorkflowAdapter {
    fn default() -> Self {
        Self::new(std::sync::Arc::new(NoopWorkflowRunner))
    }
}

#[async_trait]
impl crate::Adapter for WorkflowAdapter {
    fn kind(&self) -> ToolKind {
        ToolKind::Workflow
    }

    async fn invoke(&self, spec: &ToolSpec, args: Value, ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let result = self.runner.run(spec, args, ctx).await?;
        Ok(AdapterOutput::new(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Adapter;

    fn spec() -> ToolSpec {
        ToolSpec {
            name: "dir/wf".into(),
            version: "1.0.0".into(),
            kind: ToolKind::Workflow,
            description: String::new(),
            tags: Default::default(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: Default::default(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: toolhub_core::ToolImpl::None,
        }
    }

    #[tokio::test]
    async fn noop_runner_fails_with_upstream_error_naming_the_workflow() {
        let adapter = WorkflowAdapter::default();
        let err = adapter.invoke(&spec(), serde_json::json!({}), &ExecContext::new("r", "t")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert!(err.message.contains("dir/wf"));
    }
}
