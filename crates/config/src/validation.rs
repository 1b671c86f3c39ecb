//! Advisory validation for `RuntimeOptions`. Never fails loading; only warns.

use std::path::Path;

use crate::types::RuntimeOptions;

/// An advisory warning about a configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryWarning {
    pub code: &'static str,
    pub path: &'static str,
    pub message: String,
}

impl std::fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Collect advisory warnings about `options`. Never returns an error; callers
/// decide whether to log, print, or ignore what's returned.
#[must_use]
pub fn validate(options: &RuntimeOptions) -> Vec<AdvisoryWarning> {
    let mut warnings = Vec::new();

    if !Path::new(&options.core_tools.sandbox_root).exists() {
        warnings.push(AdvisoryWarning {
            code: "coreTools.sandboxRoot.missing",
            path: "coreTools.sandboxRoot",
            message: format!("sandbox root '{}' does not exist yet", options.core_tools.sandbox_root),
        });
    }

    if options.core_tools.allowed_hosts.is_empty() {
        warnings.push(AdvisoryWarning {
            code: "coreTools.allowedHosts.empty",
            path: "coreTools.allowedHosts",
            message: "allowedHosts is empty; every network call will be denied".to_string(),
        });
    }

    for root in &options.roots {
        if let Some(path) = root.path() {
            if !Path::new(path).exists() {
                warnings.push(AdvisoryWarning {
                    code: "roots.path.missing",
                    path: "roots",
                    message: format!("root path '{path}' does not exist"),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RootEntry;

    #[test]
    fn warns_on_empty_allowed_hosts() {
        let opts = RuntimeOptions::default();
        let warnings = validate(&opts);
        assert!(warnings.iter().any(|w| w.code == "coreTools.allowedHosts.empty"));
    }

    #[test]
    fn warns_on_missing_root_path() {
        let mut opts = RuntimeOptions::default();
        opts.roots.push(RootEntry::Plain("/does/not/exist-anywhere".to_string()));
        let warnings = validate(&opts);
        assert!(warnings.iter().any(|w| w.code == "roots.path.missing"));
    }

    #[test]
    fn a_fully_populated_config_has_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = RuntimeOptions::default();
        opts.core_tools.sandbox_root = dir.path().to_string_lossy().to_string();
        opts.core_tools.allowed_hosts = vec!["example.com".to_string()];
        let warnings = validate(&opts);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }
}
