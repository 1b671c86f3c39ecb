//! `toolhub list`: scan configured roots and print the discovered tools at
//! one of three rendering levels.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use toolhub_core::ToolSpec;
use toolhub_discovery::{scan, CodeToolRegistry, DiscoveryError};

use super::shared;

/// How much of each spec `render` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Detail {
    /// Name only, one per line.
    Short,
    /// Name, kind, version.
    Normal,
    /// Everything: description, tags, capabilities.
    Full,
}

/// Returns `Ok(true)` on a clean scan, `Ok(false)` if any directory failed to load.
pub fn run(config_path: &Path, detail: Detail) -> Result<bool> {
    let loaded = shared::load(config_path)?;
    let roots = shared::scan_roots(&loaded.options);
    let code_registry = CodeToolRegistry::new();

    let mut errors: Vec<DiscoveryError> = Vec::new();
    let mut specs = scan(&roots, &code_registry, |e| errors.push(e));
    specs.sort_by(|a, b| a.name.cmp(&b.name));

    for err in &errors {
        eprintln!("list error: {err}");
    }
    for spec in &specs {
        println!("{}", render(spec, detail));
    }

    Ok(errors.is_empty())
}

/// Pure formatting, kept free of any registry/scan dependency so it's
/// unit-testable against hand-built specs.
#[must_use]
pub fn render(spec: &ToolSpec, detail: Detail) -> String {
    match detail {
        Detail::Short => spec.name.clone(),
        Detail::Normal => format!("{}\t{}\t{}", spec.name, spec.kind, spec.version),
        Detail::Full => {
            let tags = spec.tags.iter().cloned().collect::<Vec<_>>().join(",");
            let caps = spec.capabilities.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            format!(
                "{}\t{}\t{}\n  description: {}\n  tags: [{}]\n  capabilities: [{}]",
                spec.name, spec.kind, spec.version, spec.description, tags, caps
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolhub_core::{Capability, ToolImpl, ToolKind};

    fn spec() -> ToolSpec {
        ToolSpec {
            name: "dir/example".to_string(),
            version: "1.2.0".to_string(),
            kind: ToolKind::Code,
            description: "an example tool".to_string(),
            tags: ["demo".to_string()].into_iter().collect(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: [Capability::ReadFs].into_iter().collect(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: ToolImpl::None,
        }
    }

    #[test]
    fn short_prints_only_the_name() {
        assert_eq!(render(&spec(), Detail::Short), "dir/example");
    }

    #[test]
    fn normal_prints_name_kind_version() {
        assert_eq!(render(&spec(), Detail::Normal), "dir/example\tcode\t1.2.0");
    }

    #[test]
    fn full_includes_description_tags_and_capabilities() {
        let out = render(&spec(), Detail::Full);
        assert!(out.contains("an example tool"));
        assert!(out.contains("demo"));
        assert!(out.contains("read:fs"));
    }
}
