//! Core spec model, error vocabulary, and registry for the toolhub runtime.
//!
//! This crate provides:
//! - [`ToolSpec`] / [`Capability`]: the canonical, immutable description of a tool
//! - [`ToolIntent`] / [`ExecContext`] / [`ToolResult`] / [`Evidence`]: the invocation contract
//! - [`Event`]: the observability event vocabulary (`TOOL_CALLED`, `TOOL_RESULT`, ...)
//! - [`Job`]: the async job record
//! - [`ToolError`] / [`ErrorKind`]: the closed error-kind vocabulary
//! - [`ToolRegistry`]: keyed store with tag/kind indices and search

pub mod error;
pub mod event;
pub mod job;
pub mod registry;
pub mod shutdown;
pub mod spec;

pub use error::{ErrorKind, ToolError};
pub use event::Event;
pub use job::{Job, JobStatus};
pub use registry::{SearchQuery, ToolRegistry};
pub use shutdown::ShutdownHandle;
pub use spec::{
    Capability, CostHints, EvidenceType, ExecContext, ToolEvidence, ToolIntent, ToolKind,
    ToolResult, ToolSpec,
};
