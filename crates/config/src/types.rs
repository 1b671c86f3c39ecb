//! The `RuntimeOptions` record: every section §6 of the specification recognizes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const CORE_TOOLS_SENTINEL: &str = "coreTools";

/// One entry in `roots`: a plain path, a path with an explicit namespace,
/// the bare `coreTools` sentinel, or `coreTools` with inline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum RootEntry {
    Plain(String),
    Namespaced { path: String, namespace: String },
    CoreTools,
    CoreToolsConfigured { config: serde_json::Value },
}

impl RootEntry {
    /// The filesystem path this root scans, or `None` for the `coreTools` sentinel.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            RootEntry::Plain(p) => Some(p),
            RootEntry::Namespaced { path, .. } => Some(path),
            RootEntry::CoreTools | RootEntry::CoreToolsConfigured { .. } => None,
        }
    }

    /// The namespace this root's tools are registered under, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            RootEntry::Namespaced { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_core_tools(&self) -> bool {
        matches!(self, RootEntry::CoreTools | RootEntry::CoreToolsConfigured { .. })
    }
}

impl<'de> Deserialize<'de> for RootEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) if s == CORE_TOOLS_SENTINEL => Ok(RootEntry::CoreTools),
            serde_json::Value::String(s) => Ok(RootEntry::Plain(s)),
            serde_json::Value::Object(map) => {
                let path = map.get("path");
                if path.and_then(|v| v.as_str()) == Some(CORE_TOOLS_SENTINEL) {
                    let config = map.get("config").cloned().unwrap_or(serde_json::Value::Null);
                    return Ok(RootEntry::CoreToolsConfigured { config });
                }
                let path = path
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| serde::de::Error::custom("root object entry missing string 'path'"))?
                    .to_string();
                let namespace = map
                    .get("namespace")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| serde::de::Error::custom("root object entry missing string 'namespace'"))?
                    .to_string();
                Ok(RootEntry::Namespaced { path, namespace })
            }
            other => Err(serde::de::Error::custom(format!(
                "root entry must be a string or object, got {other}"
            ))),
        }
    }
}

/// `coreTools` section: sandbox, network allow/deny lists, and size/time caps.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreToolsSection {
    pub sandbox_root: String,
    pub allowed_hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_read_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_http_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_download_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_user_agent: Option<String>,
}

impl Default for CoreToolsSection {
    fn default() -> Self {
        Self {
            sandbox_root: ".".to_string(),
            allowed_hosts: Vec::new(),
            blocked_cidrs: None,
            max_read_bytes: None,
            max_http_bytes: None,
            max_download_bytes: None,
            default_timeout_ms: None,
            http_user_agent: None,
        }
    }
}

/// `adapters` section: each sub-key is free-form configuration passed through
/// to the matching adapter, opaque to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdaptersSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<serde_json::Value>,
}

/// `watch` section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchSection {
    pub debounce_ms: u64,
    pub persistent: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            persistent: true,
        }
    }
}

/// Root configuration record, matching every section §6 of the specification recognizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeOptions {
    pub roots: Vec<RootEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    #[serde(default)]
    pub debug: bool,
    pub core_tools: CoreToolsSection,
    pub adapters: AdaptersSection,
    pub watch: WatchSection,
}
