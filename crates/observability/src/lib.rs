//! Event log, metrics, span tracing, and levelled logging for the runtime.

pub mod event_log;
pub mod logger;
pub mod metrics;
pub mod tracing_spans;

pub use event_log::{EventLog, EventQuery};
pub use logger::{LogLevel, Logger};
pub use metrics::Metrics;
pub use tracing_spans::{SpanStatus, Trace, Tracer};
