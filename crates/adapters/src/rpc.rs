//! Adapter for `rpc`-kind tools: a pluggable MCP-style client, namespace
//! prefixing, and a short-lived `listTools` cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use toolhub_core::{ErrorKind, ExecContext, ToolError, ToolKind, ToolSpec};

use crate::AdapterOutput;

const LIST_TOOLS_TTL: Duration = Duration::from_secs(30);

/// One tool as advertised by an upstream RPC server.
#[derive(Debug, Clone)]
pub struct RpcToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One part of a `callTool` result's content array.
#[derive(Debug, Clone)]
pub enum RpcContentPart {
    Text(String),
    Data(Value),
}

/// The result of a `callTool` invocation.
#[derive(Debug, Clone)]
pub struct RpcCallResult {
    pub content: Vec<RpcContentPart>,
    pub is_error: bool,
}

/// An upstream MCP-style RPC connection. Implementations own the actual
/// transport (stdio, HTTP); the adapter only knows this contract.
#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<RpcToolDescriptor>, ToolError>;
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<RpcCallResult, ToolError>;
}

struct ListToolsCache {
    fetched_at: Instant,
    tools: Vec<RpcToolDescriptor>,
}

/// Adapter for tools backed by an upstream RPC client, namespace-prefixed on
/// export (`<namespace>/<upstream-name>`) and stripped back off before the
/// underlying `callTool`.
pub struct RpcAdapter {
    client: Arc<dyn RpcClient>,
    namespace: String,
    cache: Mutex<Option<ListToolsCache>>,
}

impl RpcAdapter {
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>, namespace: impl Into<String>) -> Self {
        Self { client, namespace: namespace.into(), cache: Mutex::new(None) }
    }

    fn prefixed(&self, upstream_name: &str) -> String {
        format!("{}/{}", self.namespace, upstream_name)
    }

    fn strip_prefix<'a>(&self, full_name: &'a str) -> &'a str {
        full_name.strip_prefix(&self.namespace).and_then(|s| s.strip_prefix('/')).unwrap_or(full_name)
    }

    async fn cached_tools(&self) -> Result<Vec<RpcToolDescriptor>, ToolError> {
        if let Some(cache) = self.cache.lock().as_ref() {
            if cache.fetched_at.elapsed() < LIST_TOOLS_TTL {
                return Ok(cache.tools.clone());
            }
        }

        let tools = self.client.list_tools().await?;
        *self.cache.lock() = Some(ListToolsCache { fetched_at: Instant::now(), tools: tools.clone() });
        Ok(tools)
    }
}

impl Clone for RpcToolDescriptor {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), description: self.description.clone(), input_schema: self.input_schema.clone() }
    }
}

fn merge_content(content: Vec<RpcContentPart>) -> Value {
    let data_parts: Vec<&Value> = content
        .iter()
        .filter_map(|part| match part {
            RpcContentPart::Data(v) => Some(v),
            RpcContentPart::Text(_) => None,
        })
        .collect();
    if let Some(first) = data_parts.first() {
        return (*first).clone();
    }

    let text = content
        .iter()
        .filter_map(|part| match part {
            RpcContentPart::Text(t) => Some(t.as_str()),
            RpcContentPart::Data(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    match serde_json::from_str::<Value>(&text) {
        Ok(parsed) => parsed,
        Err(_) => serde_json::json!({ "output": text }),
    }
}

#[async_trait]
impl crate::Adapter for RpcAdapter {
    fn kind(&self) -> ToolKind {
        ToolKind::Rpc
    }

    async fn invoke(&self, spec: &ToolSpec, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let upstream_name = self.strip_prefix(&spec.name);
        let result = self.client.call_tool(upstream_name, args).await?;
        if result.is_error {
            let message = result
                .content
                .iter()
                .filter_map(|part| match part {
                    RpcContentPart::Text(t) => Some(t.clone()),
                    RpcContentPart::Data(v) => Some(v.to_string()),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ToolError::new(ErrorKind::UpstreamError, message));
        }

        let raw = serde_json::json!({ "content": result.content.iter().map(|p| match p {
            RpcContentPart::Text(t) => serde_json::json!({ "type": "text", "text": t }),
            RpcContentPart::Data(v) => serde_json::json!({ "type": "data", "data": v }),
        }).collect::<Vec<_>>() });
        Ok(AdapterOutput::with_raw(merge_content(result.content), raw))
    }

    async fn list_tools(&self) -> Option<Vec<ToolSpec>> {
        let tools = self.cached_tools().await.ok()?;
        Some(
            tools
                .into_iter()
                .map(|t| ToolSpec {
                    name: self.prefixed(&t.name),
                    version: "1.0.0".to_string(),
                    kind: ToolKind::Rpc,
                    description: t.description,
                    tags: Default::default(),
                    input_schema: t.input_schema,
                    output_schema: ToolSpec::permissive_schema(),
                    capabilities: Default::default(),
                    cost_hints: None,
                    endpoint: None,
                    resource_id: None,
                    r#impl: toolhub_core::ToolImpl::None,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl RpcClient for StubClient {
        async fn list_tools(&self) -> Result<Vec<RpcToolDescriptor>, ToolError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RpcToolDescriptor {
                name: "search".to_string(),
                description: "search the web".to_string(),
                input_schema: ToolSpec::permissive_schema(),
            }])
        }

        async fn call_tool(&self, name: &str, _arguments: Value) -> Result<RpcCallResult, ToolError> {
            if name == "failing" {
                return Ok(RpcCallResult { content: vec![RpcContentPart::Text("boom".to_string())], is_error: true });
            }
            Ok(RpcCallResult { content: vec![RpcContentPart::Data(serde_json::json!({"hits": 3}))], is_error: false })
        }
    }

    fn spec(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            version: "1.0.0".into(),
            kind: ToolKind::Rpc,
            description: String::new(),
            tags: Default::default(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: Default::default(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: toolhub_core::ToolImpl::None,
        }
    }

    #[tokio::test]
    async fn invoke_strips_namespace_prefix_before_calling_upstream() {
        let adapter = RpcAdapter::new(Arc::new(StubClient { list_calls: AtomicUsize::new(0) }), "web");
        let out = crate::Adapter::invoke(&adapter, &spec("web/search"), serde_json::json!({}), &ExecContext::new("r", "t"))
            .await
            .unwrap();
        assert_eq!(out.result, serde_json::json!({"hits": 3}));
    }

    #[tokio::test]
    async fn invoke_maps_is_error_content_to_upstream_error() {
        let adapter = RpcAdapter::new(Arc::new(StubClient { list_calls: AtomicUsize::new(0) }), "web");
        let err = crate::Adapter::invoke(&adapter, &spec("web/failing"), serde_json::json!({}), &ExecContext::new("r", "t"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert!(err.message.contains("boom"));
    }

    #[tokio::test]
    async fn list_tools_is_cached_within_ttl() {
        let client = Arc::new(StubClient { list_calls: AtomicUsize::new(0) });
        let adapter = RpcAdapter::new(client.clone(), "web");
        adapter.list_tools().await;
        adapter.list_tools().await;
        assert_eq!(client.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn list_tools_prefixes_names_with_namespace() {
        let adapter = RpcAdapter::new(Arc::new(StubClient { list_calls: AtomicUsize::new(0) }), "web");
        let tools = adapter.list_tools().await.unwrap();
        assert_eq!(tools[0].name, "web/search");
    }
}
