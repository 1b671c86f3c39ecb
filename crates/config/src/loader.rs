//! Loads a `RuntimeOptions` record from a YAML or JSON file.
//!
//! Relative paths inside the file (`roots` entries, `coreTools.sandboxRoot`)
//! are resolved against the config file's own directory, not the process's
//! current directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::{RootEntry, RuntimeOptions};
use crate::validation::{self, AdvisoryWarning};

/// A loaded configuration plus the advisory warnings `validate` produced.
#[derive(Debug)]
pub struct LoadedRuntimeOptions {
    pub options: RuntimeOptions,
    pub warnings: Vec<AdvisoryWarning>,
}

/// Load `path` as YAML or JSON (selected by extension; `.json` parses as
/// JSON, anything else as YAML), resolve its relative paths against its
/// parent directory, and run advisory validation.
///
/// # Errors
/// If the file can't be read or doesn't parse as the selected format.
pub fn load(path: &Path) -> Result<LoadedRuntimeOptions> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config file '{}'", path.display()))?;

    let mut options: RuntimeOptions = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&text).with_context(|| format!("parsing '{}' as JSON", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parsing '{}' as YAML", path.display()))?
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_relative_paths(&mut options, base_dir);

    let warnings = validation::validate(&options);
    Ok(LoadedRuntimeOptions { options, warnings })
}

fn resolve_relative_paths(options: &mut RuntimeOptions, base_dir: &Path) {
    options.core_tools.sandbox_root = resolve(&options.core_tools.sandbox_root, base_dir);

    for root in &mut options.roots {
        *root = match std::mem::replace(root, RootEntry::CoreTools) {
            RootEntry::Plain(p) => RootEntry::Plain(resolve(&p, base_dir)),
            RootEntry::Namespaced { path, namespace } => RootEntry::Namespaced { path: resolve(&path, base_dir), namespace },
            other => other,
        };
    }
}

fn resolve(candidate: &str, base_dir: &Path) -> String {
    let p = Path::new(candidate);
    if p.is_absolute() {
        candidate.to_string()
    } else {
        base_dir.join(p).to_string_lossy().to_string()
    }
}

/// Resolve to an absolute path the same way [`resolve_relative_paths`] does,
/// exposed for callers assembling paths outside a loaded config (e.g. tests).
#[must_use]
pub fn resolve_relative(candidate: &str, base_dir: &Path) -> PathBuf {
    PathBuf::from(resolve(candidate, base_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yaml_and_resolves_relative_roots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tools")).unwrap();
        let config_path = dir.path().join("toolhub.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "roots:\n  - ./tools\ncoreTools:\n  sandboxRoot: .\n  allowedHosts: [\"example.com\"]\n"
        )
        .unwrap();

        let loaded = load(&config_path).unwrap();
        assert_eq!(loaded.options.roots.len(), 1);
        assert_eq!(loaded.options.roots[0].path(), Some(dir.path().join("tools").to_string_lossy().as_ref()));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn loads_json_when_extension_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("toolhub.json");
        std::fs::write(&config_path, r#"{"roots": ["coreTools"]}"#).unwrap();

        let loaded = load(&config_path).unwrap();
        assert!(loaded.options.roots[0].is_core_tools());
    }

    #[test]
    fn missing_sandbox_root_produces_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("toolhub.yaml");
        std::fs::write(&config_path, "coreTools:\n  sandboxRoot: does-not-exist\n").unwrap();

        let loaded = load(&config_path).unwrap();
        assert!(loaded.warnings.iter().any(|w| w.code == "coreTools.sandboxRoot.missing"));
    }
}
