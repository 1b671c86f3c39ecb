//! Per-kind loaders: RPC, code, skill, workflow. Each turns one directory
//! into zero or more [`DiscoveredTool`]s.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use toolhub_core::{Capability, CostHints, ToolImpl, ToolKind, ToolSpec};

use crate::code_registry::CodeToolRegistry;
use crate::manifest::ToolManifest;
use crate::skill;

/// The loader-agnostic result of loading one tool, before conversion to a
/// [`ToolSpec`].
#[derive(Debug, Clone)]
pub struct DiscoveredTool {
    pub kind: ToolKind,
    pub name: String,
    pub version: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub capabilities: BTreeSet<Capability>,
    pub cost_hints: Option<CostHints>,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
    pub endpoint: Option<String>,
    pub resource_id: Option<String>,
    pub r#impl: ToolImpl,
}

impl DiscoveredTool {
    #[must_use]
    pub fn into_spec(self) -> ToolSpec {
        ToolSpec {
            name: self.name,
            version: self.version,
            kind: self.kind,
            description: self.description,
            tags: self.tags,
            input_schema: self.input_schema,
            output_schema: self.output_schema,
            capabilities: self.capabilities,
            cost_hints: self.cost_hints,
            endpoint: self.endpoint,
            resource_id: self.resource_id,
            r#impl: self.r#impl,
        }
    }

    fn from_manifest(kind: ToolKind, name: String, manifest: &ToolManifest, dirname: &str) -> Self {
        Self {
            kind,
            name,
            version: manifest.version.clone().unwrap_or_else(|| "1.0.0".to_string()),
            description: manifest.description.clone().unwrap_or_else(|| dirname.to_string()),
            tags: manifest.tags.iter().cloned().collect(),
            capabilities: manifest.capabilities.iter().copied().collect(),
            cost_hints: manifest.cost_hints.clone(),
            input_schema: manifest.input_schema.clone().unwrap_or_else(ToolSpec::permissive_schema),
            output_schema: manifest.output_schema.clone().unwrap_or_else(ToolSpec::permissive_schema),
            endpoint: None,
            resource_id: None,
            r#impl: ToolImpl::None,
        }
    }
}

/// `mcp.json`: either a `stdio` connection (`command`/`args`/`env`) or a `url` connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct McpManifest {
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: std::collections::BTreeMap<String, String>,
    url: Option<String>,
}

/// Parse `mcp.json` and require `command` or `url`.
///
/// # Errors
/// If `mcp.json` is missing/invalid, or neither `command` nor `url` is set.
pub fn load_rpc(dir: &Path, name: String, manifest: &ToolManifest, dirname: &str) -> Result<Vec<DiscoveredTool>, String> {
    let text = std::fs::read_to_string(dir.join("mcp.json")).map_err(|e| format!("reading mcp.json failed: {e}"))?;
    let mcp: McpManifest = serde_json::from_str(&text).map_err(|e| format!("parsing mcp.json failed: {e}"))?;

    let endpoint = match (&mcp.command, &mcp.url) {
        (Some(_), _) => {
            let descriptor = serde_json::json!({ "transport": "stdio", "command": mcp.command, "args": mcp.args, "env": mcp.env });
            Some(descriptor.to_string())
        }
        (None, Some(url)) => Some(url.clone()),
        (None, None) => return Err("mcp.json must set either 'command' or 'url'".to_string()),
    };

    let mut tool = DiscoveredTool::from_manifest(ToolKind::Rpc, name, manifest, dirname);
    tool.endpoint = endpoint;
    Ok(vec![tool])
}

/// Resolve `entry.toml`'s `key` against the host's [`CodeToolRegistry`].
///
/// # Errors
/// If `entry.toml` is missing/invalid, or the key isn't registered.
#[derive(Debug, Clone, Deserialize)]
struct EntryToml {
    key: String,
}

pub fn load_code(
    dir: &Path,
    name: String,
    manifest: &ToolManifest,
    dirname: &str,
    registry: &CodeToolRegistry,
) -> Result<Vec<DiscoveredTool>, String> {
    let text = std::fs::read_to_string(dir.join("entry.toml")).map_err(|e| format!("reading entry.toml failed: {e}"))?;
    let entry: EntryToml = toml_lite::parse_key(&text).ok_or("entry.toml must set a string 'key'")?;
    let invoker = registry.get(&entry.key).ok_or_else(|| format!("no code tool registered under key '{}'", entry.key))?;

    let mut tool = DiscoveredTool::from_manifest(ToolKind::Code, name, manifest, dirname);
    tool.r#impl = ToolImpl::Code(invoker);
    Ok(vec![tool])
}

/// `workflow.json`: requires a non-empty `nodes` array.
///
/// # Errors
/// If `workflow.json` is missing/invalid, or `nodes` is empty.
pub fn load_workflow(dir: &Path, name: String, manifest: &ToolManifest, dirname: &str) -> Result<Vec<DiscoveredTool>, String> {
    let text = std::fs::read_to_string(dir.join("workflow.json")).map_err(|e| format!("reading workflow.json failed: {e}"))?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| format!("parsing workflow.json failed: {e}"))?;
    let nodes = value.get("nodes").and_then(|v| v.as_array()).ok_or("workflow.json must have a 'nodes' array")?;
    if nodes.is_empty() {
        return Err("workflow.json 'nodes' must be non-empty".to_string());
    }

    let mut tool = DiscoveredTool::from_manifest(ToolKind::Workflow, name, manifest, dirname);
    tool.resource_id = value.get("id").and_then(|v| v.as_str()).map(str::to_string).or_else(|| Some(dirname.to_string()));
    Ok(vec![tool])
}

/// `SKILL.md`: frontmatter, bundled files, and one [`DiscoveredTool`] per program.
///
/// # Errors
/// If `SKILL.md` is missing/invalid or its frontmatter fails validation.
pub fn load_skill(dir: &Path, base_name: String, manifest: &ToolManifest, dirname: &str) -> Result<Vec<DiscoveredTool>, String> {
    let content = std::fs::read_to_string(dir.join("SKILL.md")).map_err(|e| format!("reading SKILL.md failed: {e}"))?;
    let (frontmatter, body) = skill::parse_skill_md(&content)?;
    let files = skill::collect_bundled_files(dir);
    let definitions = skill::build_program_definitions(&body, &files, frontmatter.programs.as_ref().or(manifest.programs.as_ref()), dir);

    Ok(definitions
        .into_iter()
        .enumerate()
        .map(|(i, definition)| {
            let name = if i == 0 { base_name.clone() } else { format!("{base_name}/{}", definition.program_key) };
            let mut tool = DiscoveredTool::from_manifest(ToolKind::Skill, name, manifest, dirname);
            tool.description = manifest.description.clone().unwrap_or_else(|| frontmatter.description.clone());
            tool.r#impl = ToolImpl::Skill(Arc::new(definition));
            tool
        })
        .collect())
}

/// Minimal ad hoc parser for the single `key = "..."` line `entry.toml` needs;
/// avoids pulling in a TOML parser for one field.
mod toml_lite {
    use super::EntryToml;

    pub fn parse_key(text: &str) -> Option<EntryToml> {
        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("key") {
                let rest = rest.trim_start();
                let rest = rest.strip_prefix('=')?.trim();
                let key = rest.trim_matches('"').to_string();
                if !key.is_empty() {
                    return Some(EntryToml { key });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolhub_core::ToolImpl as TImpl;

    fn empty_manifest() -> ToolManifest {
        ToolManifest::default()
    }

    #[test]
    fn load_rpc_requires_command_or_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mcp.json"), "{}").unwrap();
        let err = load_rpc(dir.path(), "dir/tool".into(), &empty_manifest(), "tool").unwrap_err();
        assert!(err.contains("command"));
    }

    #[test]
    fn load_rpc_accepts_url_form() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mcp.json"), r#"{"url":"https://example.com/mcp"}"#).unwrap();
        let tools = load_rpc(dir.path(), "dir/tool".into(), &empty_manifest(), "tool").unwrap();
        assert_eq!(tools[0].endpoint.as_deref(), Some("https://example.com/mcp"));
    }

    #[test]
    fn load_workflow_rejects_empty_nodes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("workflow.json"), r#"{"nodes":[]}"#).unwrap();
        assert!(load_workflow(dir.path(), "dir/tool".into(), &empty_manifest(), "tool").is_err());
    }

    #[test]
    fn load_workflow_accepts_nonempty_nodes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("workflow.json"), r#"{"nodes":[{"id":"a"}]}"#).unwrap();
        let tools = load_workflow(dir.path(), "dir/tool".into(), &empty_manifest(), "tool").unwrap();
        assert_eq!(tools.len(), 1);
    }

    #[test]
    fn load_code_resolves_registered_key() {
        use serde_json::Value;
        use std::future::Future;
        use std::pin::Pin;

        #[derive(Debug)]
        struct Echo;
        impl toolhub_core::Invoker for Echo {
            fn invoke<'a>(&'a self, args: Value) -> Pin<Box<dyn Future<Output = Result<Value, toolhub_core::ToolError>> + Send + 'a>> {
                Box::pin(async move { Ok(args) })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("entry.toml"), "key = \"echo\"\n").unwrap();
        let mut registry = CodeToolRegistry::new();
        registry.register("echo", Arc::new(Echo));

        let tools = load_code(dir.path(), "dir/tool".into(), &empty_manifest(), "tool", &registry).unwrap();
        assert!(matches!(tools[0].r#impl, TImpl::Code(_)));
    }

    #[test]
    fn load_code_errors_on_unregistered_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("entry.toml"), "key = \"missing\"\n").unwrap();
        let registry = CodeToolRegistry::new();
        assert!(load_code(dir.path(), "dir/tool".into(), &empty_manifest(), "tool", &registry).is_err());
    }

    #[test]
    fn load_skill_names_second_program_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SKILL.md"), "---\nname: my-skill\ndescription: does things\n---\nbody\n").unwrap();
        std::fs::write(dir.path().join("index.js"), "").unwrap();
        std::fs::write(dir.path().join("report.js"), "").unwrap();

        let tools = load_skill(dir.path(), "dir/my-skill".into(), &empty_manifest(), "my-skill").unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "dir/my-skill");
        assert_eq!(tools[1].name, "dir/my-skill/report");
    }
}
