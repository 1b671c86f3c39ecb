//! `tool.json` parsing and kind inference for a candidate tool directory.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toolhub_core::{Capability, CostHints, ToolKind};

/// The optional `tool.json` manifest a tool directory may carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolManifest {
    pub kind: Option<ToolKind>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub capabilities: Vec<Capability>,
    pub cost_hints: Option<CostHints>,
    pub entry_point: Option<String>,
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub programs: Option<std::collections::BTreeMap<String, String>>,
}

fn default_enabled() -> bool {
    true
}

/// Read and parse `tool.json` from `dir`, if present.
///
/// # Errors
/// If the file exists but isn't valid JSON.
pub fn read_manifest(dir: &Path) -> Result<Option<ToolManifest>, String> {
    let manifest_path = dir.join("tool.json");
    if !manifest_path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&manifest_path).map_err(|e| format!("reading tool.json failed: {e}"))?;
    serde_json::from_str(&text).map(Some).map_err(|e| format!("parsing tool.json failed: {e}"))
}

/// Infer `kind` from the presence of a conventional marker file when no
/// manifest (or a manifest without `kind`) says otherwise.
#[must_use]
pub fn infer_kind(dir: &Path) -> Option<ToolKind> {
    if dir.join("mcp.json").exists() {
        Some(ToolKind::Rpc)
    } else if dir.join("workflow.json").exists() {
        Some(ToolKind::Workflow)
    } else if dir.join("SKILL.md").exists() {
        Some(ToolKind::Skill)
    } else if has_code_entry(dir) {
        Some(ToolKind::Code)
    } else {
        None
    }
}

/// The Rust-native stand-in for the source ecosystem's "JS-entry file"
/// detection: a directory is a code tool candidate if it carries an
/// `entry.toml` naming a key into the host's [`crate::code_registry::CodeToolRegistry`].
fn has_code_entry(dir: &Path) -> bool {
    dir.join("entry.toml").exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_rpc_from_mcp_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mcp.json"), "{}").unwrap();
        assert_eq!(infer_kind(dir.path()), Some(ToolKind::Rpc));
    }

    #[test]
    fn infers_skill_from_skill_md() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SKILL.md"), "---\n---\n").unwrap();
        assert_eq!(infer_kind(dir.path()), Some(ToolKind::Skill));
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(infer_kind(dir.path()), None);
    }

    #[test]
    fn read_manifest_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_manifest(dir.path()).unwrap().is_none());
    }

    #[test]
    fn read_manifest_parses_present_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tool.json"), r#"{"name":"custom/name","enabled":false}"#).unwrap();
        let manifest = read_manifest(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("custom/name"));
        assert!(!manifest.enabled);
    }
}
