//! Keyed tool store with tag/kind indices and search.
//!
//! Generalizes the teacher's `ToolRegistry`/`ToolRegistryBuilder` (a
//! compile-time map from `Tool` type to `Arc<dyn ErasedTool>`) to a
//! runtime-discovered map from name to [`ToolSpec`], since tools here are
//! found on disk rather than defined as Rust types.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::spec::{Capability, ToolKind, ToolSpec};

/// Keyed store of [`ToolSpec`]s with `tag` and `kind` secondary indices.
///
/// Single-writer model: callers are expected to hold a `&mut ToolRegistry`
/// (directly, or behind an external mutex such as the runtime's) for writes;
/// readers observe a consistent snapshot once the write returns.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    by_name: HashMap<String, ToolSpec>,
    by_tag: HashMap<String, HashSet<String>>,
    by_kind: HashMap<ToolKind, HashSet<String>>,
}

/// Search filters, composed in order: kind, tags (OR), capabilities (AND), text.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub kind: Option<ToolKind>,
    pub tags: Vec<String>,
    pub capabilities: Vec<Capability>,
    pub text: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ToolKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = caps.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a spec before insertion.
    fn validate(spec: &ToolSpec) -> Result<(), String> {
        if spec.name.trim().is_empty() {
            return Err("tool spec name must not be empty".into());
        }
        if spec.version.trim().is_empty() {
            return Err(format!("tool spec '{}' must have a version", spec.name));
        }
        if spec.description.trim().is_empty() {
            return Err(format!("tool spec '{}' must have a description", spec.name));
        }
        Ok(())
    }

    /// Register a spec, overwriting any existing spec with the same name.
    ///
    /// Indices are updated by deindexing the old entry (if any) before
    /// indexing the new one, so re-registration is atomic with respect to
    /// readers observing this call.
    ///
    /// # Errors
    /// Returns a message if the spec fails validation (empty name/version/description).
    pub fn register(&mut self, spec: ToolSpec) -> Result<(), String> {
        Self::validate(&spec)?;
        self.deindex(&spec.name);

        for tag in &spec.tags {
            self.by_tag.entry(tag.clone()).or_default().insert(spec.name.clone());
        }
        self.by_kind.entry(spec.kind).or_default().insert(spec.name.clone());
        self.by_name.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Register many specs; the first validation failure aborts without
    /// registering later specs to keep the registry free of partial state.
    ///
    /// # Errors
    /// Returns a message if any spec fails validation.
    pub fn bulk_register(&mut self, specs: impl IntoIterator<Item = ToolSpec>) -> Result<(), String> {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(())
    }

    fn deindex(&mut self, name: &str) {
        if let Some(old) = self.by_name.remove(name) {
            if let Some(set) = self.by_kind.get_mut(&old.kind) {
                set.remove(name);
            }
            for tag in &old.tags {
                if let Some(set) = self.by_tag.get_mut(tag) {
                    set.remove(name);
                }
            }
        }
    }

    /// Remove a spec by name. Returns `true` if it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        let existed = self.by_name.contains_key(name);
        self.deindex(name);
        existed
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.by_name.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ToolSpec> {
        self.by_name.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_tag.clear();
        self.by_kind.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Replace the entire contents atomically (used by the watcher's refresh).
    pub fn replace_all(&mut self, specs: Vec<ToolSpec>) {
        self.clear();
        for spec in specs {
            // Discovery is expected to hand back already-validated specs; a
            // validation failure here indicates a discovery bug, not bad
            // input, so we skip rather than panic.
            let _ = self.register(spec);
        }
    }

    /// Search composes filters in order: kind, tags (OR), capabilities (AND,
    /// all required present), text (case-insensitive substring on
    /// name/description/tags).
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&ToolSpec> {
        let mut candidate_names: Option<HashSet<&str>> = None;

        if let Some(kind) = query.kind {
            let set: HashSet<&str> = self
                .by_kind
                .get(&kind)
                .map(|s| s.iter().map(String::as_str).collect())
                .unwrap_or_default();
            candidate_names = Some(intersect_or_init(candidate_names, set));
        }

        if !query.tags.is_empty() {
            let mut union: HashSet<&str> = HashSet::new();
            for tag in &query.tags {
                if let Some(names) = self.by_tag.get(tag) {
                    union.extend(names.iter().map(String::as_str));
                }
            }
            candidate_names = Some(intersect_or_init(candidate_names, union));
        }

        let mut results: Vec<&ToolSpec> = match candidate_names {
            Some(names) => names
                .into_iter()
                .filter_map(|n| self.by_name.get(n))
                .collect(),
            None => self.by_name.values().collect(),
        };

        if !query.capabilities.is_empty() {
            let required: BTreeSet<Capability> = query.capabilities.iter().copied().collect();
            results.retain(|spec| required.is_subset(&spec.capabilities));
        }

        if let Some(text) = &query.text {
            let needle = text.to_lowercase();
            results.retain(|spec| {
                spec.name.to_lowercase().contains(&needle)
                    || spec.description.to_lowercase().contains(&needle)
                    || spec.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            });
        }

        results.sort_by(|a, b| a.name.cmp(&b.name));
        results
    }
}

fn intersect_or_init<'a>(acc: Option<HashSet<&'a str>>, next: HashSet<&'a str>) -> HashSet<&'a str> {
    match acc {
        Some(existing) => existing.intersection(&next).copied().collect(),
        None => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn spec(name: &str, kind: ToolKind, tags: &[&str], caps: &[Capability]) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            version: "1.0.0".into(),
            kind,
            description: format!("description for {name}"),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: caps.iter().copied().collect(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: crate::spec::ToolImpl::None,
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/echo", ToolKind::Code, &[], &[])).unwrap();
        assert!(reg.has("dir/echo"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_rejects_empty_name() {
        let mut reg = ToolRegistry::new();
        let err = reg
            .register(spec("", ToolKind::Code, &[], &[]))
            .unwrap_err();
        assert!(err.contains("name"));
    }

    #[test]
    fn reregister_overwrites_and_reindexes() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/x", ToolKind::Code, &["alpha"], &[])).unwrap();
        reg.register(spec("dir/x", ToolKind::Rpc, &["beta"], &[])).unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("dir/x").unwrap().kind, ToolKind::Rpc);
        assert!(reg.search(&SearchQuery::new().with_tags(["alpha".to_string()])).is_empty());
        assert_eq!(
            reg.search(&SearchQuery::new().with_tags(["beta".to_string()])).len(),
            1
        );
    }

    #[test]
    fn unregister_removes_from_indices() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/x", ToolKind::Code, &["t"], &[])).unwrap();
        assert!(reg.unregister("dir/x"));
        assert!(!reg.unregister("dir/x"));
        assert!(reg.search(&SearchQuery::new().with_kind(ToolKind::Code)).is_empty());
    }

    #[test]
    fn search_by_kind() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/a", ToolKind::Code, &[], &[])).unwrap();
        reg.register(spec("dir/b", ToolKind::Rpc, &[], &[])).unwrap();
        let found = reg.search(&SearchQuery::new().with_kind(ToolKind::Code));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "dir/a");
    }

    #[test]
    fn search_by_capabilities_requires_superset() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/a", ToolKind::Core, &[], &[Capability::Network])).unwrap();
        reg.register(spec(
            "dir/b",
            ToolKind::Core,
            &[],
            &[Capability::Network, Capability::ReadFs],
        ))
        .unwrap();
        reg.register(spec("dir/c", ToolKind::Core, &[], &[])).unwrap();

        let found = reg.search(&SearchQuery::new().with_capabilities([Capability::Network]));
        let names: BTreeSet<_> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["dir/a", "dir/b"]));
    }

    #[test]
    fn search_by_text_is_case_insensitive_substring() {
        let mut reg = ToolRegistry::new();
        let mut s = spec("dir/yahoo-search", ToolKind::Rpc, &[], &[]);
        s.description = "Query the Yahoo search engine".into();
        reg.register(s).unwrap();

        assert_eq!(reg.search(&SearchQuery::new().with_text("YAHOO")).len(), 1);
        assert_eq!(reg.search(&SearchQuery::new().with_text("nonexistent")).len(), 0);
    }

    #[test]
    fn search_combines_filters() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/a", ToolKind::Core, &["x"], &[Capability::Network])).unwrap();
        reg.register(spec("dir/b", ToolKind::Code, &["x"], &[Capability::Network])).unwrap();

        let found = reg.search(
            &SearchQuery::new()
                .with_kind(ToolKind::Core)
                .with_tags(["x".to_string()])
                .with_capabilities([Capability::Network]),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "dir/a");
    }

    #[test]
    fn replace_all_swaps_contents_atomically() {
        let mut reg = ToolRegistry::new();
        reg.register(spec("dir/old", ToolKind::Code, &[], &[])).unwrap();
        reg.replace_all(vec![spec("dir/new", ToolKind::Code, &[], &[])]);
        assert!(!reg.has("dir/old"));
        assert!(reg.has("dir/new"));
    }
}
