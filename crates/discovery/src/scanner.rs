//! Scans configured roots into a flat list of `ToolSpec`s.

use std::path::Path;

use toolhub_core::{ToolKind, ToolSpec};

use crate::code_registry::CodeToolRegistry;
use crate::error::DiscoveryError;
use crate::loaders;
use crate::manifest;

/// One configured scan root.
#[derive(Debug, Clone)]
pub struct ScanRoot {
    pub path: String,
    pub namespace: Option<String>,
}

/// Scan every root, invoking `on_error` for each directory that fails to
/// load, and return every successfully loaded [`ToolSpec`].
///
/// Missing root directories are reported through `on_error` and skipped;
/// individual tool-directory failures never abort the overall scan.
pub fn scan(roots: &[ScanRoot], registry: &CodeToolRegistry, mut on_error: impl FnMut(DiscoveryError)) -> Vec<ToolSpec> {
    let mut specs = Vec::new();

    for root in roots {
        let root_path = Path::new(&root.path);
        let read_dir = match std::fs::read_dir(root_path) {
            Ok(rd) => rd,
            Err(e) => {
                on_error(DiscoveryError::new(root_path, format!("root is not accessible: {e}")));
                continue;
            }
        };

        let namespace = root.namespace.as_deref().unwrap_or("dir");

        for entry in read_dir.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            match load_one(&dir, namespace, registry) {
                Ok(Some(tools)) => specs.extend(tools),
                Ok(None) => {}
                Err(message) => on_error(DiscoveryError::new(&dir, message)),
            }
        }
    }

    specs
}

fn load_one(dir: &Path, namespace: &str, registry: &CodeToolRegistry) -> Result<Option<Vec<ToolSpec>>, String> {
    let manifest = manifest::read_manifest(dir)?.unwrap_or_default();
    if !manifest.enabled {
        return Ok(None);
    }

    let kind = manifest.kind.or_else(|| manifest::infer_kind(dir));
    let Some(kind) = kind else {
        return Ok(None);
    };

    let dirname = dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let base_name = manifest.name.clone().unwrap_or_else(|| format!("{namespace}/{dirname}"));

    let discovered = match kind {
        ToolKind::Rpc => loaders::load_rpc(dir, base_name, &manifest, &dirname)?,
        ToolKind::Code => loaders::load_code(dir, base_name, &manifest, &dirname, registry)?,
        ToolKind::Workflow => loaders::load_workflow(dir, base_name, &manifest, &dirname)?,
        ToolKind::Skill => loaders::load_skill(dir, base_name, &manifest, &dirname)?,
        ToolKind::Core => return Err("'core' is not a discoverable kind".to_string()),
    };

    Ok(Some(discovered.into_iter().map(loaders::DiscoveredTool::into_spec).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_a_root_and_produces_a_spec_per_tool_dir() {
        let root = tempfile::tempdir().unwrap();
        let tool_dir = root.path().join("my-workflow");
        std::fs::create_dir(&tool_dir).unwrap();
        std::fs::write(tool_dir.join("workflow.json"), r#"{"nodes":[{"id":"a"}]}"#).unwrap();

        let registry = CodeToolRegistry::new();
        let roots = vec![ScanRoot { path: root.path().to_string_lossy().to_string(), namespace: None }];
        let mut errors = Vec::new();
        let specs = scan(&roots, &registry, |e| errors.push(e));

        assert!(errors.is_empty());
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "dir/my-workflow");
        assert_eq!(specs[0].kind, ToolKind::Workflow);
    }

    #[test]
    fn reports_missing_root_via_on_error_and_continues() {
        let registry = CodeToolRegistry::new();
        let roots = vec![ScanRoot { path: "/definitely/not/a/real/path".to_string(), namespace: None }];
        let mut errors = Vec::new();
        let specs = scan(&roots, &registry, |e| errors.push(e));

        assert_eq!(specs.len(), 0);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn skips_tool_directories_with_enabled_false() {
        let root = tempfile::tempdir().unwrap();
        let tool_dir = root.path().join("disabled-workflow");
        std::fs::create_dir(&tool_dir).unwrap();
        std::fs::write(tool_dir.join("workflow.json"), r#"{"nodes":[{"id":"a"}]}"#).unwrap();
        std::fs::write(tool_dir.join("tool.json"), r#"{"enabled":false}"#).unwrap();

        let registry = CodeToolRegistry::new();
        let roots = vec![ScanRoot { path: root.path().to_string_lossy().to_string(), namespace: None }];
        let mut errors = Vec::new();
        let specs = scan(&roots, &registry, |e| errors.push(e));

        assert!(specs.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn per_directory_load_errors_are_reported_and_scan_continues() {
        let root = tempfile::tempdir().unwrap();
        let bad_dir = root.path().join("broken-rpc");
        std::fs::create_dir(&bad_dir).unwrap();
        std::fs::write(bad_dir.join("mcp.json"), "{}").unwrap();
        let good_dir = root.path().join("good-workflow");
        std::fs::create_dir(&good_dir).unwrap();
        std::fs::write(good_dir.join("workflow.json"), r#"{"nodes":[{"id":"a"}]}"#).unwrap();

        let registry = CodeToolRegistry::new();
        let roots = vec![ScanRoot { path: root.path().to_string_lossy().to_string(), namespace: None }];
        let mut errors = Vec::new();
        let specs = scan(&roots, &registry, |e| errors.push(e));

        assert_eq!(specs.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
