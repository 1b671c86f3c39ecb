//! Observability event vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;

/// A single observability event, discriminated by `type`.
///
/// Every invocation emits exactly one `ToolCalled` followed by exactly one
/// terminal event sharing the same `request_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "TOOL_CALLED")]
    ToolCalled {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        args: Value,
    },
    #[serde(rename = "TOOL_RESULT")]
    ToolResult {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        ok: bool,
        latency_ms: u64,
    },
    #[serde(rename = "POLICY_DENIED")]
    PolicyDenied {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },
    #[serde(rename = "RETRY")]
    Retry {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        attempt: u32,
    },
    #[serde(rename = "TIMEOUT")]
    Timeout {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        elapsed_ms: u64,
    },
    #[serde(rename = "BUDGET_EXCEEDED")]
    BudgetExceeded {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },
    #[serde(rename = "JOB_SUBMITTED")]
    JobSubmitted {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        job_id: String,
    },
    #[serde(rename = "JOB_COMPLETED")]
    JobCompleted {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        job_id: String,
    },
    #[serde(rename = "JOB_FAILED")]
    JobFailed {
        request_id: String,
        task_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
        job_id: String,
        error_kind: ErrorKind,
    },
}

impl Event {
    /// The discriminant, matching the wire `type` tag (e.g. `"TOOL_CALLED"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::ToolCalled { .. } => "TOOL_CALLED",
            Event::ToolResult { .. } => "TOOL_RESULT",
            Event::PolicyDenied { .. } => "POLICY_DENIED",
            Event::Retry { .. } => "RETRY",
            Event::Timeout { .. } => "TIMEOUT",
            Event::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Event::JobSubmitted { .. } => "JOB_SUBMITTED",
            Event::JobCompleted { .. } => "JOB_COMPLETED",
            Event::JobFailed { .. } => "JOB_FAILED",
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Event::ToolCalled { request_id, .. }
            | Event::ToolResult { request_id, .. }
            | Event::PolicyDenied { request_id, .. }
            | Event::Retry { request_id, .. }
            | Event::Timeout { request_id, .. }
            | Event::BudgetExceeded { request_id, .. }
            | Event::JobSubmitted { request_id, .. }
            | Event::JobCompleted { request_id, .. }
            | Event::JobFailed { request_id, .. } => request_id,
        }
    }

    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Event::ToolCalled { tool_name, .. }
            | Event::ToolResult { tool_name, .. }
            | Event::PolicyDenied { tool_name, .. }
            | Event::Retry { tool_name, .. }
            | Event::Timeout { tool_name, .. }
            | Event::BudgetExceeded { tool_name, .. }
            | Event::JobSubmitted { tool_name, .. }
            | Event::JobCompleted { tool_name, .. }
            | Event::JobFailed { tool_name, .. } => tool_name,
        }
    }

    /// True for the four event types that may terminate an invocation.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::ToolResult { .. }
                | Event::PolicyDenied { .. }
                | Event::BudgetExceeded { .. }
                | Event::Timeout { .. }
        )
    }
}
