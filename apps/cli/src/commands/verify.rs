//! `toolhub verify`: surface advisory config warnings and discovery errors
//! without registering anything, for CI or pre-flight checks.

use std::path::Path;

use anyhow::Result;
use toolhub_discovery::{scan, CodeToolRegistry, DiscoveryError};

use super::shared;

/// Returns `Ok(true)` if the config loaded and every root scanned cleanly.
/// Advisory warnings are printed but never fail the check.
pub fn run(config_path: &Path) -> Result<bool> {
    let loaded = shared::load(config_path)?;

    for warning in &loaded.warnings {
        println!("warning: {warning}");
    }

    let roots = shared::scan_roots(&loaded.options);
    let code_registry = CodeToolRegistry::new();

    let mut errors: Vec<DiscoveryError> = Vec::new();
    let specs = scan(&roots, &code_registry, |e| errors.push(e));

    for err in &errors {
        eprintln!("error: {err}");
    }

    if errors.is_empty() {
        println!("ok: {} tool(s) would be registered from {} root(s)", specs.len(), roots.len());
    }

    Ok(errors.is_empty())
}
