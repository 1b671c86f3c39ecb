//! Per-kind `invoke(spec, args, ctx)` implementations, registered on the
//! runtime keyed by [`ToolKind`].

pub mod code;
pub mod core;
pub mod rpc;
pub mod skill;
pub mod workflow;

use async_trait::async_trait;
use serde_json::Value;
use toolhub_core::{ExecContext, ToolError, ToolEvidence, ToolKind, ToolSpec};

/// What an adapter hands back to the runtime before output-schema validation.
#[derive(Debug, Clone)]
pub struct AdapterOutput {
    pub result: Value,
    pub raw: Option<Value>,
    pub evidence: Vec<ToolEvidence>,
}

impl AdapterOutput {
    #[must_use]
    pub fn new(result: Value) -> Self {
        Self { result, raw: None, evidence: Vec::new() }
    }

    #[must_use]
    pub fn with_raw(result: Value, raw: Value) -> Self {
        Self { result, raw: Some(raw), evidence: Vec::new() }
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: Vec<ToolEvidence>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// A per-kind tool invoker. Adapters are registered on the runtime keyed by
/// [`Adapter::kind`]; `list_tools` is optional, feeding pull-mode discovery
/// for adapters backed by a live remote registry (RPC).
#[async_trait]
pub trait Adapter: Send + Sync {
    fn kind(&self) -> ToolKind;

    async fn invoke(&self, spec: &ToolSpec, args: Value, ctx: &ExecContext) -> Result<AdapterOutput, ToolError>;

    async fn list_tools(&self) -> Option<Vec<ToolSpec>> {
        None
    }
}

pub use code::CodeAdapter;
pub use core::{CoreAdapter, CoreHandler};
pub use rpc::{RpcAdapter, RpcCallResult, RpcClient, RpcContentPart, RpcToolDescriptor};
pub use skill::{NoopSkillHandlerRunner, SkillAdapter, SkillHandlerRunner};
pub use workflow::{NoopWorkflowRunner, WorkflowAdapter, WorkflowRunner};
