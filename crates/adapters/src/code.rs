//! Adapter for `code`-kind tools: calls the loaded [`Invoker`] directly.

use async_trait::async_trait;
use serde_json::Value;
use toolhub_core::{ExecContext, ToolError, ToolImpl, ToolKind, ToolSpec};

use crate::AdapterOutput;

/// Dispatches to whatever [`Invoker`](toolhub_core::Invoker) discovery attached
/// to the spec's `r#impl`. Holds no state of its own.
#[derive(Debug, Default)]
pub struct CodeAdapter;

#[async_trait]
impl crate::Adapter for CodeAdapter {
    fn kind(&self) -> ToolKind {
        ToolKind::Code
    }

    async fn invoke(&self, spec: &ToolSpec, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let ToolImpl::Code(invoker) = &spec.r#impl else {
            return Err(ToolError::upstream(format!("'{}' has no loaded code implementation", spec.name)));
        };
        let result = invoker.invoke(args).await?;
        Ok(AdapterOutput::new(result))
    }
}
