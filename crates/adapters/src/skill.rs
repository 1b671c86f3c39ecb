//! Adapter for `skill`-kind tools: instruction-only specs return the
//! instructions verbatim; specs with a handler delegate to a pluggable runner.

use async_trait::async_trait;
use serde_json::Value;
use toolhub_core::{ErrorKind, ExecContext, ToolError, ToolImpl, ToolKind, ToolSpec};

use crate::AdapterOutput;

/// Executes a skill's program handler. A real host wires this to whatever
/// runs bundled program files; there is no portable way to load one in-process.
#[async_trait]
pub trait SkillHandlerRunner: Send + Sync {
    async fn run(&self, handler_path: &str, args: Value) -> Result<Value, ToolError>;
}

/// Default runner for hosts that haven't wired one up: any handler invocation
/// fails with `UPSTREAM_ERROR`. Instruction-only skills never reach it.
#[derive(Debug, Default)]
pub struct NoopSkillHandlerRunner;

#[async_trait]
impl SkillHandlerRunner for NoopSkillHandlerRunner {
    async fn run(&self, handler_path: &str, _args: Value) -> Result<Value, ToolError> {
        Err(ToolError::upstream(format!("no skill handler runner configured to run '{handler_path}'")))
    }
}

pub struct SkillAdapter {
    runner: std::sync::Arc<dyn SkillHandlerRunner>,
}

impl SkillAdapter {
    #[must_use]
    pub fn new(runner: std::sync::Arc<dyn SkillHandlerRunner>) -> Self {
        Self { runner }
    }
}

impl Default for SkillAdapter {
    fn default() -> Self {
        Self::new(std::sync::Arc::new(NoopSkillHandlerRunner))
    }
}

#[async_trait]
impl crate::Adapter for SkillAdapter {
    fn kind(&self) -> ToolKind {
        ToolKind::Skill
    }

    async fn invoke(&self, spec: &ToolSpec, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let ToolImpl::Skill(definition) = &spec.r#impl else {
            return Err(ToolError::new(ErrorKind::UpstreamError, format!("'{}' has no loaded skill definition", spec.name)));
        };

        match &definition.handler_path {
            None => Ok(AdapterOutput::new(serde_json::json!({ "result": definition.instructions }))),
            Some(handler_path) => {
                let result = self.runner.run(handler_path, args).await?;
                Ok(AdapterOutput::new(result))
            }
        }
    }
}
