//! Config loading and root-resolution shared by every subcommand.

use std::path::Path;

use anyhow::{Context, Result};
use toolhub_config::{LoadedRuntimeOptions, RootEntry, RuntimeOptions};
use toolhub_discovery::ScanRoot;

/// Load `path`, surfacing a plain error (no backtrace noise) when it's missing.
pub fn load(path: &Path) -> Result<LoadedRuntimeOptions> {
    if !path.exists() {
        anyhow::bail!("config file '{}' does not exist", path.display());
    }
    toolhub_config::load(path).with_context(|| format!("loading config file '{}'", path.display()))
}

/// The directory roots configuration asks discovery to scan. The `coreTools`
/// sentinel isn't a directory, so it's skipped here.
#[must_use]
pub fn scan_roots(options: &RuntimeOptions) -> Vec<ScanRoot> {
    options
        .roots
        .iter()
        .filter_map(|root| match root {
            RootEntry::Plain(path) => Some(ScanRoot { path: path.clone(), namespace: options.namespace.clone() }),
            RootEntry::Namespaced { path, namespace } => {
                Some(ScanRoot { path: path.clone(), namespace: Some(namespace.clone()) })
            }
            RootEntry::CoreTools | RootEntry::CoreToolsConfigured { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_tools_entries_are_not_scan_roots() {
        let mut options = RuntimeOptions::default();
        options.roots.push(RootEntry::Plain("./tools".to_string()));
        options.roots.push(RootEntry::CoreTools);
        let roots = scan_roots(&options);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "./tools");
    }

    #[test]
    fn namespaced_root_overrides_the_top_level_default_namespace() {
        let mut options = RuntimeOptions::default();
        options.namespace = Some("default-ns".to_string());
        options.roots.push(RootEntry::Namespaced { path: "./a".to_string(), namespace: "special".to_string() });
        let roots = scan_roots(&options);
        assert_eq!(roots[0].namespace.as_deref(), Some("special"));
    }
}
