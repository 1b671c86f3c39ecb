//! Counter and histogram metrics keyed by `name{sorted_labels}`.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Default latency histogram bucket boundaries, in milliseconds.
pub const DEFAULT_LATENCY_BUCKETS_MS: [f64; 11] =
    [5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0];

#[derive(Debug, Clone, Default)]
struct Histogram {
    buckets: Vec<(f64, u64)>,
    sum: f64,
    count: u64,
}

impl Histogram {
    fn new(bucket_bounds: &[f64]) -> Self {
        Self {
            buckets: bucket_bounds.iter().map(|b| (*b, 0)).collect(),
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        for (bound, count) in &mut self.buckets {
            if value <= *bound {
                *count += 1;
            }
        }
    }
}

/// Labels attached to a metric recording. Serialized key order is sorted to
/// form a stable metric identity, matching the spec's `name{sorted_labels}` form.
pub type Labels = BTreeMap<String, String>;

fn metric_key(name: &str, labels: &Labels) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let rendered = labels
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}{{{rendered}}}")
}

/// In-memory counter/histogram registry.
#[derive(Default)]
pub struct Metrics {
    counters: Mutex<BTreeMap<String, u64>>,
    histograms: Mutex<BTreeMap<String, Histogram>>,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by one.
    pub fn incr(&self, name: &str, labels: &Labels) {
        self.incr_by(name, labels, 1);
    }

    /// Increment a counter by an arbitrary amount.
    pub fn incr_by(&self, name: &str, labels: &Labels, delta: u64) {
        let key = metric_key(name, labels);
        *self.counters.lock().entry(key).or_insert(0) += delta;
    }

    #[must_use]
    pub fn counter_value(&self, name: &str, labels: &Labels) -> u64 {
        let key = metric_key(name, labels);
        self.counters.lock().get(&key).copied().unwrap_or(0)
    }

    /// Record an observation into a histogram, using the default latency buckets.
    pub fn observe(&self, name: &str, labels: &Labels, value_ms: f64) {
        self.observe_with_buckets(name, labels, value_ms, &DEFAULT_LATENCY_BUCKETS_MS);
    }

    pub fn observe_with_buckets(&self, name: &str, labels: &Labels, value: f64, bucket_bounds: &[f64]) {
        let key = metric_key(name, labels);
        let mut histograms = self.histograms.lock();
        histograms
            .entry(key)
            .or_insert_with(|| Histogram::new(bucket_bounds))
            .observe(value);
    }

    #[must_use]
    pub fn histogram_count(&self, name: &str, labels: &Labels) -> u64 {
        let key = metric_key(name, labels);
        self.histograms.lock().get(&key).map_or(0, |h| h.count)
    }

    #[must_use]
    pub fn histogram_sum(&self, name: &str, labels: &Labels) -> f64 {
        let key = metric_key(name, labels);
        self.histograms.lock().get(&key).map_or(0.0, |h| h.sum)
    }

    /// Record a standard `tool_invocations_total{toolName,ok}` + `tool_latency_ms{toolName}` pair.
    pub fn record_invocation(&self, tool_name: &str, ok: bool, latency_ms: f64) {
        let mut labels = Labels::new();
        labels.insert("toolName".into(), tool_name.into());
        labels.insert("ok".into(), ok.to_string());
        self.incr("tool_invocations_total", &labels);

        let mut latency_labels = Labels::new();
        latency_labels.insert("toolName".into(), tool_name.into());
        self.observe("tool_latency_ms", &latency_labels, latency_ms);
    }

    pub fn record_retry(&self, tool_name: &str) {
        let mut labels = Labels::new();
        labels.insert("toolName".into(), tool_name.into());
        self.incr("tool_retries_total", &labels);
    }

    pub fn record_policy_denied(&self, tool_name: &str, reason: &str) {
        let mut labels = Labels::new();
        labels.insert("toolName".into(), tool_name.into());
        labels.insert("reason".into(), reason.into());
        self.incr("policy_denied_total", &labels);
    }
}
