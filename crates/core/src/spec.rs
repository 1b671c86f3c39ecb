//! Canonical tool description and the invocation contract types.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability label attached to a spec and checked against the caller's granted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Capability {
    #[serde(rename = "read:web")]
    ReadWeb,
    #[serde(rename = "read:fs")]
    ReadFs,
    #[serde(rename = "write:fs")]
    WriteFs,
    #[serde(rename = "read:db")]
    ReadDb,
    #[serde(rename = "write:db")]
    WriteDb,
    #[serde(rename = "network")]
    Network,
    #[serde(rename = "gpu")]
    Gpu,
    #[serde(rename = "workflow")]
    Workflow,
    #[serde(rename = "danger:destructive")]
    DangerDestructive,
}

impl Capability {
    /// Stable wire label, e.g. `"read:web"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ReadWeb => "read:web",
            Capability::ReadFs => "read:fs",
            Capability::WriteFs => "write:fs",
            Capability::ReadDb => "read:db",
            Capability::WriteDb => "write:db",
            Capability::Network => "network",
            Capability::Gpu => "gpu",
            Capability::Workflow => "workflow",
            Capability::DangerDestructive => "danger:destructive",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of tool a spec was discovered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Rpc,
    Code,
    Workflow,
    Skill,
    Core,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolKind::Rpc => "rpc",
            ToolKind::Code => "code",
            ToolKind::Workflow => "workflow",
            ToolKind::Skill => "skill",
            ToolKind::Core => "core",
        };
        f.write_str(s)
    }
}

/// Optional cost/latency hints surfaced by discovery or a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostHints {
    pub latency_p50: Option<u64>,
    pub latency_p95: Option<u64>,
    #[serde(default)]
    pub is_async: bool,
}

/// Opaque, in-process handle or skill definition consumed only by the matching adapter.
///
/// The registry treats this as inert payload; it never inspects or clones deeply beyond
/// what `Clone`/`Debug` give it for free.
#[derive(Debug, Clone, Default)]
pub enum ToolImpl {
    /// No adapter-private payload (e.g. a pure RPC or workflow spec).
    #[default]
    None,
    /// A code tool's normalized invoker, erased behind [`crate::spec::Invoker`].
    Code(std::sync::Arc<dyn Invoker>),
    /// A skill's parsed definition (instructions, bundled files, optional handler).
    Skill(std::sync::Arc<SkillDefinition>),
}

/// Transport-agnostic single-entry-point contract every code tool shape collapses to.
///
/// The three duck-typed JS shapes the source supports (class, instance, bare callable)
/// all normalise to this at load time; the registry and runtime never see the difference.
pub trait Invoker: Send + Sync + std::fmt::Debug {
    /// Invoke the tool with JSON arguments, returning a JSON result.
    fn invoke<'a>(
        &'a self,
        args: Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Value, crate::ToolError>> + Send + 'a>>;
}

/// A bundled file discovered alongside a skill's `SKILL.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillFile {
    pub relative_path: String,
    pub class: SkillFileClass,
}

/// Classification of a skill's bundled files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SkillFileClass {
    Instructions,
    Code,
    Data,
}

/// A parsed `SKILL.md` plus its bundled files, shared across one-to-many program specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    pub instructions: String,
    pub files: Vec<SkillFile>,
    /// Program key this spec corresponds to (e.g. `"default"`, `"report"`).
    pub program_key: String,
    /// Relative path to the program's handler file, if any. `None` means instruction-only.
    pub handler_path: Option<String>,
}

/// Canonical, immutable-after-registration tool description.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    /// Globally unique name, conventionally `namespace/tool`.
    pub name: String,
    /// Semver string.
    pub version: String,
    pub kind: ToolKind,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub input_schema: Value,
    pub output_schema: Value,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
    #[serde(default)]
    pub cost_hints: Option<CostHints>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,

    /// Opaque in-process payload, consumed only by the matching adapter. Never serialized.
    #[serde(skip, default)]
    pub r#impl: ToolImpl,
}

impl ToolSpec {
    /// A permissive `{"type": "object"}` schema, used as the default when a manifest omits one.
    #[must_use]
    pub fn permissive_schema() -> Value {
        serde_json::json!({ "type": "object" })
    }

    /// True if `spec.capabilities` is a subset of `granted`.
    #[must_use]
    pub fn capabilities_satisfied_by(&self, granted: &BTreeSet<Capability>) -> bool {
        self.capabilities.is_subset(granted)
    }

    /// Capabilities present on the spec but missing from `granted`.
    #[must_use]
    pub fn missing_capabilities(&self, granted: &BTreeSet<Capability>) -> Vec<Capability> {
        self.capabilities.difference(granted).copied().collect()
    }
}

/// Untrusted input the agent supplies when requesting a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolIntent {
    pub tool: String,
    pub args: Value,
    pub purpose: String,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Trusted input supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    pub request_id: String,
    pub task_id: String,
    pub permissions: BTreeSet<Capability>,
    pub budget: Option<ExecBudget>,
    pub trace_id: Option<String>,
    pub user_id: Option<String>,
    pub dry_run: bool,
    /// Explicit opt-in required to exercise `danger:destructive` capabilities.
    pub allow_destructive: bool,
}

impl ExecContext {
    #[must_use]
    pub fn new(request_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            task_id: task_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_permissions(mut self, perms: impl IntoIterator<Item = Capability>) -> Self {
        self.permissions = perms.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: ExecBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn allowing_destructive(mut self) -> Self {
        self.allow_destructive = true;
        self
    }
}

/// Per-call budget overrides carried on [`ExecContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecBudget {
    pub timeout_ms: Option<u64>,
}

/// An auditable fact captured during invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvidence {
    #[serde(rename = "type")]
    pub kind: EvidenceType,
    pub r#ref: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl ToolEvidence {
    #[must_use]
    pub fn new(kind: EvidenceType, r#ref: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            kind,
            r#ref: r#ref.into(),
            summary: summary.into(),
            created_at: Utc::now(),
        }
    }
}

/// Evidence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Tool,
    File,
    Url,
    Text,
    Metric,
}

/// The outcome of a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub evidence: Vec<ToolEvidence>,
    #[serde(default)]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub raw: Option<Value>,
}

impl ToolResult {
    #[must_use]
    pub fn success(result: Value, evidence: Vec<ToolEvidence>) -> Self {
        Self {
            ok: true,
            result: Some(result),
            evidence,
            error: None,
            raw: None,
        }
    }

    #[must_use]
    pub fn failure(error: crate::ToolError) -> Self {
        Self {
            ok: false,
            result: None,
            evidence: Vec::new(),
            error: Some(error),
            raw: None,
        }
    }

    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Map form, used by adapters that extract parameter-level fields for policy checks.
pub type ArgMap = HashMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_wire_labels_round_trip() {
        for cap in [
            Capability::ReadWeb,
            Capability::WriteFs,
            Capability::DangerDestructive,
        ] {
            let json = serde_json::to_string(&cap).unwrap();
            let back: Capability = serde_json::from_str(&json).unwrap();
            assert_eq!(cap, back);
            assert_eq!(json.trim_matches('"'), cap.as_str());
        }
    }

    #[test]
    fn capability_satisfaction() {
        let spec_caps: BTreeSet<Capability> = [Capability::WriteFs].into_iter().collect();
        let granted: BTreeSet<Capability> = [Capability::WriteFs, Capability::Network]
            .into_iter()
            .collect();
        assert!(spec_caps.is_subset(&granted));

        let empty = BTreeSet::new();
        assert!(!spec_caps.is_subset(&empty));
    }

    #[test]
    fn tool_spec_missing_capabilities_lists_exact_gap() {
        let spec = ToolSpec {
            name: "dir/tool".into(),
            version: "1.0.0".into(),
            kind: ToolKind::Core,
            description: "d".into(),
            tags: BTreeSet::new(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: [Capability::WriteFs, Capability::Network].into_iter().collect(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: ToolImpl::None,
        };
        let missing = spec.missing_capabilities(&BTreeSet::new());
        assert_eq!(missing.len(), 2);
    }
}
