//! In-process span/trace data model, layered over `tracing::Span` for the
//! ambient structured-logging surface every teacher binary already emits to.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

/// Terminal status of a completed span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error,
}

/// A single point-in-time annotation recorded on a span.
#[derive(Debug, Clone)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub attributes: BTreeMap<String, Value>,
}

/// A recorded span: open (`ended_at: None`) or completed.
#[derive(Debug, Clone)]
pub struct SpanRecord {
    pub span_id: String,
    pub trace_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: Option<SpanStatus>,
    pub attributes: BTreeMap<String, Value>,
    pub events: Vec<SpanEvent>,
}

/// Handle to a started span. Dropping without calling [`Span::end`] leaves
/// the record open in the owning [`Tracer`].
///
/// Holds a plain `tracing::Span` handle rather than an entered guard, so a
/// `Span` can be kept alive across `.await` points (as `Runtime::invoke_tool`
/// does) without the thread-local re-entrancy hazards `Span::entered()` warns
/// against; each mutation re-enters the `tracing::Span` only for the
/// duration of that synchronous call via `in_scope`.
pub struct Span<'a> {
    tracer: &'a Tracer,
    span_id: String,
    tracing_span: tracing::Span,
}

impl Span<'_> {
    #[must_use]
    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// Merge attributes into the span's recorded attribute map.
    pub fn set_attributes(&self, attrs: impl IntoIterator<Item = (String, Value)>) {
        self.tracer.with_span_mut(&self.span_id, |span| {
            span.attributes.extend(attrs);
        });
    }

    /// Append a timestamped event to the span.
    pub fn add_event(&self, name: impl Into<String>, attributes: BTreeMap<String, Value>) {
        let name = name.into();
        self.tracer.with_span_mut(&self.span_id, |span| {
            span.events.push(SpanEvent {
                name: name.clone(),
                timestamp: Utc::now(),
                attributes,
            });
        });
        self.tracing_span.in_scope(|| tracing::trace!(event = %name, "span event"));
    }

    /// Close the span with a terminal status.
    pub fn end(self, status: SpanStatus) {
        self.tracer.with_span_mut(&self.span_id, |span| {
            span.ended_at = Some(Utc::now());
            span.status = Some(status);
        });
        let span_id = self.span_id.clone();
        self.tracing_span.in_scope(|| match status {
            SpanStatus::Ok => tracing::trace!(span_id = %span_id, "span ended ok"),
            SpanStatus::Error => tracing::warn!(span_id = %span_id, "span ended in error"),
        });
    }
}

/// Ordered list of spans sharing a `traceId`.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub trace_id: String,
    pub spans: Vec<SpanRecord>,
}

impl Trace {
    #[must_use]
    pub fn spans(&self) -> &[SpanRecord] {
        &self.spans
    }
}

/// Owns every span ever started, indexed by trace id.
///
/// This is the in-process data model the spec calls for; every [`Span`] also
/// opens a real `tracing::Span` so the ambient structured-logging layer sees
/// the same invocation boundaries.
#[derive(Default)]
pub struct Tracer {
    traces: Mutex<BTreeMap<String, Vec<SpanRecord>>>,
}

impl Tracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new span under `trace_id` (generated if `None`), optionally
    /// nested under `parent_span_id`.
    pub fn start(
        &self,
        name: &'static str,
        trace_id: Option<String>,
        parent_span_id: Option<String>,
    ) -> Span<'_> {
        let trace_id = trace_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let span_id = Uuid::new_v4().to_string();

        let record = SpanRecord {
            span_id: span_id.clone(),
            trace_id: trace_id.clone(),
            parent_span_id: parent_span_id.clone(),
            name: name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            status: None,
            attributes: BTreeMap::new(),
            events: Vec::new(),
        };
        self.traces.lock().entry(trace_id.clone()).or_default().push(record);

        let tracing_span = tracing::info_span!(
            "tool.invoke",
            otel.name = name,
            trace.id = %trace_id,
            span.id = %span_id,
            parent.span.id = parent_span_id.as_deref().unwrap_or(""),
        );
        tracing_span.in_scope(|| tracing::trace!("span started"));

        Span {
            tracer: self,
            span_id,
            tracing_span,
        }
    }

    fn with_span_mut(&self, span_id: &str, f: impl FnOnce(&mut SpanRecord)) {
        let mut traces = self.traces.lock();
        for spans in traces.values_mut() {
            if let Some(span) = spans.iter_mut().find(|s| s.span_id == span_id) {
                f(span);
                return;
            }
        }
    }

    /// Snapshot the full ordered trace for `trace_id`.
    #[must_use]
    pub fn trace(&self, trace_id: &str) -> Option<Trace> {
        self.traces.lock().get(trace_id).map(|spans| Trace {
            trace_id: trace_id.to_string(),
            spans: spans.clone(),
        })
    }
}
