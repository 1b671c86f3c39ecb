//! Async job record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Lifecycle state of an async job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

/// A long-running tool invocation tracked by the job manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub tool_name: String,
    pub request_id: String,
    pub task_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl Job {
    #[must_use]
    pub fn new(
        job_id: impl Into<String>,
        tool_name: impl Into<String>,
        request_id: impl Into<String>,
        task_id: impl Into<String>,
        metadata: Option<Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            tool_name: tool_name.into(),
            request_id: request_id.into(),
            task_id: task_id.into(),
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
            metadata,
        }
    }

    /// True once the job has reached a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}
