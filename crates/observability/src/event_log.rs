//! Append-only, bounded event log with monotonic sequence numbers.
//!
//! Generalizes the teacher's JSONL `LogWriter` (`agentic_logging::LogWriter`)
//! from an on-disk append log to an in-memory ring buffer, since events here
//! are queried back in-process rather than replayed from files.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use toolhub_core::Event;

const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A logged event, stamped with its log-assigned sequence number.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub logged_at: DateTime<Utc>,
    pub event: Event,
}

/// Filters for [`EventLog::query`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub type_name: Option<&'static str>,
    pub tool_name: Option<String>,
    pub request_id: Option<String>,
    pub since: Option<u64>,
    pub limit: Option<usize>,
}

struct Inner {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
    max_entries: usize,
}

/// Bounded ring buffer of [`Event`]s behind a fan-out subscriber channel.
///
/// Subscription returns an unsubscribe handle in the form of the receiver
/// itself being dropped, per the spec's observer-surface design note.
pub struct EventLog {
    inner: Mutex<Inner>,
    sender: tokio::sync::broadcast::Sender<LogEntry>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(1024);
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(max_entries.min(1024)),
                next_seq: 1,
                max_entries,
            }),
            sender,
        }
    }

    /// Append an event, evicting the oldest entry once `max_entries` is exceeded.
    pub fn append(&self, event: Event) -> u64 {
        let entry = {
            let mut inner = self.inner.lock();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            let entry = LogEntry {
                seq,
                logged_at: Utc::now(),
                event,
            };
            if inner.entries.len() >= inner.max_entries {
                inner.entries.pop_front();
            }
            inner.entries.push_back(entry.clone());
            entry
        };
        let seq = entry.seq;
        // No subscribers is not an error: fan-out is best-effort.
        let _ = self.sender.send(entry);
        seq
    }

    /// Subscribe to all future appended entries.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    /// Query a snapshot of the log applying filters in order: type, tool name,
    /// request id, since (sequence number, exclusive), then limit (most recent first).
    #[must_use]
    pub fn query(&self, query: &EventQuery) -> Vec<LogEntry> {
        let inner = self.inner.lock();
        let mut results: Vec<LogEntry> = inner
            .entries
            .iter()
            .filter(|e| query.type_name.is_none_or(|t| e.event.type_name() == t))
            .filter(|e| {
                query
                    .tool_name
                    .as_deref()
                    .is_none_or(|t| e.event.tool_name() == t)
            })
            .filter(|e| {
                query
                    .request_id
                    .as_deref()
                    .is_none_or(|r| e.event.request_id() == r)
            })
            .filter(|e| query.since.is_none_or(|since| e.seq > since))
            .cloned()
            .collect();

        results.reverse();
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
