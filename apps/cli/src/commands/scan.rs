//! `toolhub scan`: discover tools under the configured roots and report a count.

use std::path::Path;

use anyhow::Result;
use toolhub_discovery::{scan, CodeToolRegistry, DiscoveryError};

use super::shared;

/// Returns `Ok(true)` on a clean scan, `Ok(false)` if any directory failed to load.
pub fn run(config_path: &Path) -> Result<bool> {
    let loaded = shared::load(config_path)?;
    let roots = shared::scan_roots(&loaded.options);
    let code_registry = CodeToolRegistry::new();

    let mut errors: Vec<DiscoveryError> = Vec::new();
    let specs = scan(&roots, &code_registry, |e| errors.push(e));

    for err in &errors {
        eprintln!("scan error: {err}");
    }
    println!("discovered {} tool(s) across {} root(s)", specs.len(), roots.len());

    Ok(errors.is_empty())
}
