//! `submit`/`markRunning`/`complete`/`fail`/`getStatus`/`getJob`/`getResult`/`list`,
//! backed by a pluggable [`JobStore`] and fanning lifecycle transitions out to
//! the shared [`EventLog`] as `JOB_SUBMITTED`/`JOB_COMPLETED`/`JOB_FAILED`.

use std::sync::Arc;

use serde_json::Value;
use toolhub_core::{ErrorKind, Event, Job, JobStatus, ToolError};
use toolhub_observability::EventLog;
use uuid::Uuid;

use crate::store::{JobFilter, JobStore};

/// Fields supplied when submitting a new job.
#[derive(Debug, Clone)]
pub struct SubmitOpts {
    pub tool_name: String,
    pub request_id: String,
    pub task_id: String,
    pub metadata: Option<Value>,
}

/// Owns the job store and event log; the single entry point async tool
/// invocations register themselves against.
pub struct JobManager {
    store: Arc<dyn JobStore>,
    event_log: Arc<EventLog>,
}

impl JobManager {
    #[must_use]
    pub fn new(store: Arc<dyn JobStore>, event_log: Arc<EventLog>) -> Self {
        Self { store, event_log }
    }

    /// Create a `queued` job and append `JOB_SUBMITTED`.
    #[must_use]
    pub fn submit(&self, opts: SubmitOpts) -> Job {
        let job_id = Uuid::new_v4().to_string();
        let job = Job::new(job_id.clone(), opts.tool_name.clone(), opts.request_id.clone(), opts.task_id.clone(), opts.metadata);
        self.store.insert(job.clone());
        self.event_log.append(Event::JobSubmitted {
            request_id: opts.request_id,
            task_id: opts.task_id,
            tool_name: opts.tool_name,
            timestamp: chrono::Utc::now(),
            job_id,
        });
        job
    }

    /// Transition a `queued` job to `running`. No-op on an unknown job id.
    pub fn mark_running(&self, job_id: &str) -> Option<Job> {
        self.store.transition(job_id, JobStatus::Running, None, None)
    }

    /// Transition to `completed` with a result, appending `JOB_COMPLETED`.
    pub fn complete(&self, job_id: &str, result: Value) -> Option<Job> {
        let job = self.store.transition(job_id, JobStatus::Completed, Some(result), None)?;
        self.event_log.append(Event::JobCompleted {
            request_id: job.request_id.clone(),
            task_id: job.task_id.clone(),
            tool_name: job.tool_name.clone(),
            timestamp: chrono::Utc::now(),
            job_id: job.job_id.clone(),
        });
        Some(job)
    }

    /// Transition to `failed` with an error, appending `JOB_FAILED`.
    pub fn fail(&self, job_id: &str, error: ToolError) -> Option<Job> {
        let error_kind = error.kind;
        let job = self.store.transition(job_id, JobStatus::Failed, None, Some(error))?;
        self.event_log.append(Event::JobFailed {
            request_id: job.request_id.clone(),
            task_id: job.task_id.clone(),
            tool_name: job.tool_name.clone(),
            timestamp: chrono::Utc::now(),
            job_id: job.job_id.clone(),
            error_kind,
        });
        Some(job)
    }

    #[must_use]
    pub fn get_status(&self, job_id: &str) -> Option<JobStatus> {
        self.store.get(job_id).map(|j| j.status)
    }

    #[must_use]
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.store.get(job_id)
    }

    /// The job's result, or `None` if it doesn't exist or hasn't completed.
    #[must_use]
    pub fn get_result(&self, job_id: &str) -> Option<Value> {
        let job = self.store.get(job_id)?;
        if job.status == JobStatus::Completed {
            job.result
        } else {
            None
        }
    }

    #[must_use]
    pub fn list(&self, filter: &JobFilter) -> Vec<Job> {
        self.store.list(filter)
    }

    /// Remove every terminal job whose `updated_at` is older than `ttl_ms`, returning the count evicted.
    pub fn sweep(&self, ttl_ms: u64) -> usize {
        let cutoff = chrono::Utc::now() - chrono::Duration::milliseconds(ttl_ms as i64);
        let candidates = self.store.sweep_candidates(cutoff);
        for job_id in &candidates {
            self.store.remove(job_id);
        }
        candidates.len()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }
}

/// `ToolError` wrapper for fail-ing jobs whose underlying invocation errored
/// upstream without a more specific kind, matching the runtime's own fallback.
#[must_use]
pub fn upstream_error(message: impl Into<String>) -> ToolError {
    ToolError::new(ErrorKind::UpstreamError, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryJobStore;

    fn manager() -> JobManager {
        JobManager::new(Arc::new(InMemoryJobStore::new()), Arc::new(EventLog::new()))
    }

    fn opts() -> SubmitOpts {
        SubmitOpts { tool_name: "dir/a".into(), request_id: "r1".into(), task_id: "t1".into(), metadata: None }
    }

    #[test]
    fn submit_mark_running_complete_traverses_statuses() {
        let mgr = manager();
        let job = mgr.submit(opts());
        assert_eq!(job.status, JobStatus::Queued);

        mgr.mark_running(&job.job_id);
        assert_eq!(mgr.get_status(&job.job_id), Some(JobStatus::Running));

        mgr.complete(&job.job_id, serde_json::json!({"n": 1}));
        assert_eq!(mgr.get_status(&job.job_id), Some(JobStatus::Completed));
        assert_eq!(mgr.get_result(&job.job_id), Some(serde_json::json!({"n": 1})));
    }

    #[test]
    fn get_result_on_non_completed_job_returns_absence() {
        let mgr = manager();
        let job = mgr.submit(opts());
        assert_eq!(mgr.get_result(&job.job_id), None);

        mgr.mark_running(&job.job_id);
        assert_eq!(mgr.get_result(&job.job_id), None);
    }

    #[test]
    fn fail_records_the_error_kind() {
        let mgr = manager();
        let job = mgr.submit(opts());
        mgr.fail(&job.job_id, upstream_error("boom"));
        let failed = mgr.get_job(&job.job_id).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.unwrap().kind, ErrorKind::UpstreamError);
    }

    #[test]
    fn lifecycle_transitions_are_logged() {
        let mgr = manager();
        let job = mgr.submit(opts());
        mgr.complete(&job.job_id, serde_json::json!(null));

        let entries = mgr.event_log.query(&Default::default());
        let type_names: Vec<_> = entries.iter().map(|e| e.event.type_name()).collect();
        assert!(type_names.contains(&"JOB_SUBMITTED"));
        assert!(type_names.contains(&"JOB_COMPLETED"));
    }

    #[test]
    fn sweep_evicts_only_terminal_jobs_past_ttl() {
        let mgr = manager();
        let job = mgr.submit(opts());
        mgr.complete(&job.job_id, serde_json::json!(null));

        assert_eq!(mgr.sweep(3_600_000), 0, "default 1h ttl hasn't elapsed yet");
        assert_eq!(mgr.sweep(0), 1, "a zero ttl means anything already terminal is swept");
        assert!(mgr.get_job(&job.job_id).is_none());
    }
}
