//! `invokeTool`: lookup → input schema → policy → budget → adapter → output
//! schema → observability, exactly per the documented pipeline order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use toolhub_adapters::Adapter;
use toolhub_budget::BudgetRegistry;
use toolhub_core::{ErrorKind, Event, EvidenceType, ExecContext, ShutdownHandle, ToolError, ToolEvidence, ToolKind, ToolRegistry, ToolResult, ToolSpec};
use toolhub_core_tools::CoreToolsConfig;
use toolhub_observability::tracing_spans::SpanStatus;
use toolhub_observability::{EventLog, Metrics, Tracer};
use toolhub_policy::PolicyConfig;

use crate::schema;

/// Owns the registry, the per-kind adapters, and every observability/budget
/// collaborator; `invoke_tool` is the single entry point an agent calls.
pub struct Runtime {
    registry: Arc<RwLock<ToolRegistry>>,
    adapters: HashMap<ToolKind, Arc<dyn Adapter>>,
    policy_config: PolicyConfig,
    budgets: BudgetRegistry,
    event_log: Arc<EventLog>,
    metrics: Arc<Metrics>,
    tracer: Arc<Tracer>,
    shutdown: ShutdownHandle,
    /// When set, a `core`-kind result whose serialized size exceeds
    /// `max_inline_result_bytes` is spilled to `<sandboxRoot>/.toolhub/large-results/`
    /// and replaced with a truncated preview plus a file evidence entry.
    core_tools_config: Option<Arc<CoreToolsConfig>>,
}

impl Runtime {
    #[must_use]
    pub fn new(
        registry: ToolRegistry,
        adapters: HashMap<ToolKind, Arc<dyn Adapter>>,
        policy_config: PolicyConfig,
        budgets: BudgetRegistry,
        event_log: Arc<EventLog>,
        metrics: Arc<Metrics>,
        tracer: Arc<Tracer>,
    ) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            adapters,
            policy_config,
            budgets,
            event_log,
            metrics,
            tracer,
            shutdown: ShutdownHandle::new(),
            core_tools_config: None,
        }
    }

    /// Enable the large-result spill behavior for `core`-kind invocations,
    /// using the same config the `core` adapter was built from.
    #[must_use]
    pub fn with_core_tools_config(mut self, config: Arc<CoreToolsConfig>) -> Self {
        self.core_tools_config = Some(config);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &RwLock<ToolRegistry> {
        &self.registry
    }

    /// A cloned handle over the same registry, for the watcher's background
    /// refresh task to hold independently of the runtime's own lifetime.
    #[must_use]
    pub fn registry_handle(&self) -> Arc<RwLock<ToolRegistry>> {
        self.registry.clone()
    }

    #[must_use]
    pub fn event_log(&self) -> &Arc<EventLog> {
        &self.event_log
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Cancel timers, stop accepting new work conceptually, and flush the
    /// event log's pending state. Background tickers (watcher, job sweeper)
    /// hold the same [`ShutdownHandle`] and exit their loops on `wait()`.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Run the full invocation pipeline. Never returns an `Err`: every
    /// failure is captured into `ToolResult{ok:false, error}` at this boundary.
    pub async fn invoke_tool(&self, name: &str, args: serde_json::Value, ctx: &ExecContext) -> ToolResult {
        let Some(spec) = self.registry.read().get(name).cloned() else {
            return ToolResult::failure(ToolError::tool_not_found(name));
        };

        let span = self.tracer.start("tool.invoke", ctx.trace_id.clone(), None);
        span.set_attributes([
            ("tool.name".to_string(), serde_json::json!(name)),
            ("request.id".to_string(), serde_json::json!(ctx.request_id)),
        ]);
        self.event_log.append(Event::ToolCalled {
            request_id: ctx.request_id.clone(),
            task_id: ctx.task_id.clone(),
            tool_name: name.to_string(),
            timestamp: chrono::Utc::now(),
            args: args.clone(),
        });

        let started_at = std::time::Instant::now();

        if let Err(err) = schema::validate_against(&spec.input_schema, &args, ErrorKind::InputSchemaInvalid) {
            return self.fail_terminal(&spec, ctx, span, started_at, err);
        }

        if let Err(err) = toolhub_policy::check(&spec, &args, ctx, &self.policy_config) {
            self.metrics.record_policy_denied(name, &err.message);
            self.event_log.append(Event::PolicyDenied {
                request_id: ctx.request_id.clone(),
                task_id: ctx.task_id.clone(),
                tool_name: name.to_string(),
                timestamp: chrono::Utc::now(),
                reason: err.message.clone(),
            });
            span.end(SpanStatus::Error);
            self.metrics.record_invocation(name, false, started_at.elapsed().as_secs_f64() * 1000.0);
            return ToolResult::failure(err);
        }

        let Some(adapter) = self.adapters.get(&spec.kind).cloned() else {
            let err = ToolError::upstream(format!("no adapter registered for kind '{}'", spec.kind));
            return self.fail_terminal(&spec, ctx, span, started_at, err);
        };

        let budget = self.budgets.get_or_create(name);
        let ctx_timeout_ms = ctx.budget.and_then(|b| b.timeout_ms);
        let spec_for_call = spec.clone();
        let args_for_call = args.clone();
        let ctx_for_call = ctx.clone();
        let result = budget
            .execute(ctx_timeout_ms, move || async move {
                adapter.invoke(&spec_for_call, args_for_call, &ctx_for_call).await
            })
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                match err.kind {
                    ErrorKind::BudgetExceeded => {
                        self.event_log.append(Event::BudgetExceeded {
                            request_id: ctx.request_id.clone(),
                            task_id: ctx.task_id.clone(),
                            tool_name: name.to_string(),
                            timestamp: chrono::Utc::now(),
                            reason: err.message.clone(),
                        });
                    }
                    ErrorKind::Timeout => {
                        self.event_log.append(Event::Timeout {
                            request_id: ctx.request_id.clone(),
                            task_id: ctx.task_id.clone(),
                            tool_name: name.to_string(),
                            timestamp: chrono::Utc::now(),
                            elapsed_ms: started_at.elapsed().as_millis() as u64,
                        });
                    }
                    _ => {}
                }
                return self.fail_terminal(&spec, ctx, span, started_at, err);
            }
        };

        if let Err(err) = schema::validate_against(&spec.output_schema, &output.result, ErrorKind::OutputSchemaInvalid) {
            return self.fail_terminal(&spec, ctx, span, started_at, err);
        }

        let latency_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        self.metrics.record_invocation(name, true, latency_ms);
        self.event_log.append(Event::ToolResult {
            request_id: ctx.request_id.clone(),
            task_id: ctx.task_id.clone(),
            tool_name: name.to_string(),
            timestamp: chrono::Utc::now(),
            ok: true,
            latency_ms: latency_ms as u64,
        });
        span.set_attributes([("ok".to_string(), serde_json::json!(true))]);
        span.end(SpanStatus::Ok);

        let (result, mut evidence) = self.maybe_spill_large_result(&spec, output.result).await;
        evidence.extend(output.evidence);

        let mut final_result = ToolResult::success(result, evidence);
        if let Some(raw) = output.raw {
            final_result = final_result.with_raw(raw);
        }
        final_result
    }

    /// For `core`-kind results over `max_inline_result_bytes` (when
    /// `enableAutoWriteLargeResponses` is set), write the full result to
    /// `<sandboxRoot>/.toolhub/large-results/<uuid>.json` and return a
    /// truncated preview plus a file evidence entry pointing at it.
    async fn maybe_spill_large_result(&self, spec: &ToolSpec, result: serde_json::Value) -> (serde_json::Value, Vec<ToolEvidence>) {
        let Some(config) = &self.core_tools_config else {
            return (result, Vec::new());
        };
        if spec.kind != ToolKind::Core || !config.enable_auto_write_large_responses {
            return (result, Vec::new());
        }

        let Ok(serialized) = serde_json::to_vec(&result) else {
            return (result, Vec::new());
        };
        if (serialized.len() as u64) <= config.max_inline_result_bytes {
            return (result, Vec::new());
        }

        let dir = config.sandbox_root.join(".toolhub").join("large-results");
        let file_path = dir.join(format!("{}.json", uuid::Uuid::new_v4()));

        if tokio::fs::create_dir_all(&dir).await.is_err() || tokio::fs::write(&file_path, &serialized).await.is_err() {
            tracing::warn!(tool = %spec.name, "failed to spill large result to disk; returning it inline");
            return (result, Vec::new());
        }

        let preview_len = serialized.len().min(config.max_inline_result_bytes as usize);
        let preview = String::from_utf8_lossy(&serialized[..preview_len]).into_owned();
        let preview_value = serde_json::json!({
            "truncated": true,
            "preview": preview,
            "fullResultPath": file_path.to_string_lossy(),
        });
        let evidence = ToolEvidence::new(
            EvidenceType::File,
            file_path.to_string_lossy().to_string(),
            format!("full result ({} bytes) written to disk", serialized.len()),
        );
        (preview_value, vec![evidence])
    }

    fn fail_terminal(
        &self,
        spec: &ToolSpec,
        ctx: &ExecContext,
        span: toolhub_observability::tracing_spans::Span<'_>,
        started_at: std::time::Instant,
        err: ToolError,
    ) -> ToolResult {
        let latency_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        self.metrics.record_invocation(&spec.name, false, latency_ms);
        self.event_log.append(Event::ToolResult {
            request_id: ctx.request_id.clone(),
            task_id: ctx.task_id.clone(),
            tool_name: spec.name.clone(),
            timestamp: chrono::Utc::now(),
            ok: false,
            latency_ms: latency_ms as u64,
        });
        span.end(SpanStatus::Error);
        ToolResult::failure(err)
    }
}
