//! Wires `toolhub-core-tools`'s fs/http/util functions into per-name
//! [`CoreHandler`]s and assembles a [`CoreAdapter`] from them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use toolhub_adapters::{AdapterOutput, CoreAdapter, CoreHandler};
use toolhub_core::{ErrorKind, ExecContext, ToolError};
use toolhub_core_tools::CoreToolsConfig;

fn str_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::input_schema_invalid(format!("missing required string argument '{key}'")))
}

struct ReadText {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for ReadText {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let path = str_arg(&args, "path")?;
        let (content, evidence) = toolhub_core_tools::fs::read_text(&self.config, &path).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "content": content })).with_evidence(evidence))
    }
}

struct WriteText {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for WriteText {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let path = str_arg(&args, "path")?;
        let content = str_arg(&args, "content")?;
        let evidence = toolhub_core_tools::fs::write_text(&self.config, &path, &content).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "written": true })).with_evidence(evidence))
    }
}

struct ListDir {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for ListDir {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let path = str_arg(&args, "path")?;
        let (entries, evidence) = toolhub_core_tools::fs::list_dir(&self.config, &path).await?;
        let result = serde_json::to_value(entries).map_err(|e| ToolError::upstream(e.to_string()))?;
        Ok(AdapterOutput::new(serde_json::json!({ "entries": result })).with_evidence(evidence))
    }
}

struct SearchText {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for SearchText {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let path = str_arg(&args, "path")?;
        let query = str_arg(&args, "query")?;
        let (matches, evidence) = toolhub_core_tools::fs::search_text(&self.config, &path, &query).await?;
        let result = serde_json::to_value(matches).map_err(|e| ToolError::upstream(e.to_string()))?;
        Ok(AdapterOutput::new(serde_json::json!({ "matches": result })).with_evidence(evidence))
    }
}

struct Sha256Fs {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for Sha256Fs {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let path = str_arg(&args, "path")?;
        let (hex, evidence) = toolhub_core_tools::fs::sha256(&self.config, &path).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "sha256": hex })).with_evidence(evidence))
    }
}

struct DeletePath {
    config: Arc<CoreToolsConfig>,
}
#[async_trait]
impl CoreHandler for DeletePath {
    async fn call(&self, args: Value, ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        if !ctx.allow_destructive {
            return Err(ToolError::policy_denied_reason("danger:destructive requires an explicit allow_destructive opt-in"));
        }
        let path = str_arg(&args, "path")?;
        let evidence = toolhub_core_tools::fs::delete_path(&self.config, &path).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "deleted": true })).with_evidence(evidence))
    }
}

struct FetchText {
    config: Arc<CoreToolsConfig>,
    client: reqwest::Client,
}
#[async_trait]
impl CoreHandler for FetchText {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let url = str_arg(&args, "url")?;
        let (text, evidence) = toolhub_core_tools::http::fetch_text(&self.client, &self.config, &url).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "text": text })).with_evidence(evidence))
    }
}

struct FetchJson {
    config: Arc<CoreToolsConfig>,
    client: reqwest::Client,
}
#[async_trait]
impl CoreHandler for FetchJson {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let url = str_arg(&args, "url")?;
        let (json, evidence) = toolhub_core_tools::http::fetch_json(&self.client, &self.config, &url).await?;
        Ok(AdapterOutput::new(json).with_evidence(evidence))
    }
}

struct Head {
    config: Arc<CoreToolsConfig>,
    client: reqwest::Client,
}
#[async_trait]
impl CoreHandler for Head {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let url = str_arg(&args, "url")?;
        let (head, evidence) = toolhub_core_tools::http::head(&self.client, &self.config, &url).await?;
        let result = serde_json::to_value(head).map_err(|e| ToolError::upstream(e.to_string()))?;
        Ok(AdapterOutput::new(result).with_evidence(evidence))
    }
}

struct DownloadFile {
    config: Arc<CoreToolsConfig>,
    client: reqwest::Client,
}
#[async_trait]
impl CoreHandler for DownloadFile {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let url = str_arg(&args, "url")?;
        let dest = str_arg(&args, "dest")?;
        let overwrite = args.get("overwrite").and_then(Value::as_bool).unwrap_or(false);
        let (hex, evidence) = toolhub_core_tools::http::download_file(&self.client, &self.config, &url, &dest, overwrite).await?;
        Ok(AdapterOutput::new(serde_json::json!({ "sha256": hex })).with_evidence(evidence))
    }
}

struct JsonSelect;
#[async_trait]
impl CoreHandler for JsonSelect {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let input = args.get("input").cloned().unwrap_or(Value::Null);
        let expression = str_arg(&args, "expression")?;
        let selected = toolhub_core_tools::util::json_select(&input, &expression)?;
        Ok(AdapterOutput::new(serde_json::json!({ "selected": selected })))
    }
}

struct Truncate;
#[async_trait]
impl CoreHandler for Truncate {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let text = str_arg(&args, "text")?;
        let max_chars = args.get("maxChars").and_then(Value::as_u64).unwrap_or(200) as usize;
        let truncated = toolhub_core_tools::util::truncate(&text, max_chars);
        Ok(AdapterOutput::new(serde_json::json!({ "truncated": truncated })))
    }
}

struct HashText;
#[async_trait]
impl CoreHandler for HashText {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let text = str_arg(&args, "text")?;
        let hash = toolhub_core_tools::util::hash_text(&text);
        Ok(AdapterOutput::new(serde_json::json!({ "sha256": hash })))
    }
}

struct TimeNow;
#[async_trait]
impl CoreHandler for TimeNow {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let zone = args.get("timezone").and_then(Value::as_str);
        let format = args.get("format").and_then(Value::as_str);
        let now = toolhub_core_tools::util::time_now(zone, format)?;
        let result = serde_json::to_value(now).map_err(|e| ToolError::upstream(e.to_string()))?;
        Ok(AdapterOutput::new(result))
    }
}

struct TemplateRender;
#[async_trait]
impl CoreHandler for TemplateRender {
    async fn call(&self, args: Value, _ctx: &ExecContext) -> Result<AdapterOutput, ToolError> {
        let template = str_arg(&args, "template")?;
        let values: std::collections::HashMap<String, String> = args
            .get("values")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let rendered = toolhub_core_tools::util::template_render(&template, &values)?;
        Ok(AdapterOutput::new(serde_json::json!({ "rendered": rendered })))
    }
}

/// Build a [`CoreAdapter`] with every `core/*` built-in registered under its
/// conventional name.
#[must_use]
pub fn build_core_adapter(config: Arc<CoreToolsConfig>, client: reqwest::Client) -> CoreAdapter {
    let mut adapter = CoreAdapter::new();
    adapter
        .register("core/fs.readText", Arc::new(ReadText { config: config.clone() }))
        .register("core/fs.writeText", Arc::new(WriteText { config: config.clone() }))
        .register("core/fs.listDir", Arc::new(ListDir { config: config.clone() }))
        .register("core/fs.searchText", Arc::new(SearchText { config: config.clone() }))
        .register("core/fs.sha256", Arc::new(Sha256Fs { config: config.clone() }))
        .register("core/fs.deletePath", Arc::new(DeletePath { config: config.clone() }))
        .register("core/http.fetchText", Arc::new(FetchText { config: config.clone(), client: client.clone() }))
        .register("core/http.fetchJson", Arc::new(FetchJson { config: config.clone(), client: client.clone() }))
        .register("core/http.head", Arc::new(Head { config: config.clone(), client: client.clone() }))
        .register("core/http.downloadFile", Arc::new(DownloadFile { config, client }))
        .register("core/util.json.select", Arc::new(JsonSelect))
        .register("core/util.truncate", Arc::new(Truncate))
        .register("core/util.hashText", Arc::new(HashText))
        .register("core/util.time.now", Arc::new(TimeNow))
        .register("core/util.templateRender", Arc::new(TemplateRender));
    adapter
}
