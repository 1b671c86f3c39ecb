//! Pluggable job storage. The default is an in-memory map; a persistent
//! store just needs to implement the same trait.

use chrono::{DateTime, Utc};
use toolhub_core::{Job, JobStatus};

/// Filters for [`JobStore::list`], composed in order: status, tool name, task id.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub tool_name: Option<String>,
    pub task_id: Option<String>,
}

/// Storage backing the job manager. Implementations must be safe to share
/// across the manager's API surface and the background sweeper.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: Job);
    fn get(&self, job_id: &str) -> Option<Job>;

    /// Apply a status transition, returning the updated job if it existed.
    fn transition(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<toolhub_core::ToolError>,
    ) -> Option<Job>;

    fn list(&self, filter: &JobFilter) -> Vec<Job>;
    fn remove(&self, job_id: &str) -> Option<Job>;

    /// Job ids in a terminal state whose `updated_at` is at or before `cutoff`.
    fn sweep_candidates(&self, cutoff: DateTime<Utc>) -> Vec<String>;
}

/// Default in-memory [`JobStore`], keyed by job id.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: parking_lot::Mutex<std::collections::HashMap<String, Job>>,
}

impl InMemoryJobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: Job) {
        self.jobs.lock().insert(job.job_id.clone(), job);
    }

    fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs.lock().get(job_id).cloned()
    }

    fn transition(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<toolhub_core::ToolError>,
    ) -> Option<Job> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(job_id)?;
        job.status = status;
        job.updated_at = Utc::now();
        if result.is_some() {
            job.result = result;
        }
        if error.is_some() {
            job.error = error;
        }
        Some(job.clone())
    }

    fn list(&self, filter: &JobFilter) -> Vec<Job> {
        self.jobs
            .lock()
            .values()
            .filter(|j| filter.status.is_none_or(|s| j.status == s))
            .filter(|j| filter.tool_name.as_deref().is_none_or(|t| j.tool_name == t))
            .filter(|j| filter.task_id.as_deref().is_none_or(|t| j.task_id == t))
            .cloned()
            .collect()
    }

    fn remove(&self, job_id: &str) -> Option<Job> {
        self.jobs.lock().remove(job_id)
    }

    fn sweep_candidates(&self, cutoff: DateTime<Utc>) -> Vec<String> {
        self.jobs
            .lock()
            .values()
            .filter(|j| j.is_terminal() && j.updated_at <= cutoff)
            .map(|j| j.job_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> Job {
        Job::new(id, "dir/a", "r1", "t1", None)
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = InMemoryJobStore::new();
        store.insert(job("j1"));
        assert_eq!(store.get("j1").unwrap().status, JobStatus::Queued);
    }

    #[test]
    fn transition_updates_status_and_result() {
        let store = InMemoryJobStore::new();
        store.insert(job("j1"));
        store.transition("j1", JobStatus::Running, None, None);
        assert_eq!(store.get("j1").unwrap().status, JobStatus::Running);

        store.transition("j1", JobStatus::Completed, Some(serde_json::json!({"ok": true})), None);
        let done = store.get("j1").unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.result, Some(serde_json::json!({"ok": true})));
    }

    #[test]
    fn list_filters_by_status_and_tool_name() {
        let store = InMemoryJobStore::new();
        store.insert(job("j1"));
        store.insert(Job::new("j2", "dir/b", "r2", "t2", None));
        store.transition("j2", JobStatus::Running, None, None);

        let running = store.list(&JobFilter { status: Some(JobStatus::Running), ..Default::default() });
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].job_id, "j2");

        let by_tool = store.list(&JobFilter { tool_name: Some("dir/a".into()), ..Default::default() });
        assert_eq!(by_tool.len(), 1);
        assert_eq!(by_tool[0].job_id, "j1");
    }

    #[test]
    fn sweep_candidates_only_returns_terminal_jobs_past_cutoff() {
        let store = InMemoryJobStore::new();
        store.insert(job("queued"));
        store.insert(job("done"));
        store.transition("done", JobStatus::Completed, None, None);

        let future_cutoff = Utc::now() + chrono::Duration::seconds(60);
        let candidates = store.sweep_candidates(future_cutoff);
        assert_eq!(candidates, vec!["done".to_string()]);
    }
}
