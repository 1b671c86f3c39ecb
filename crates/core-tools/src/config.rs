//! Shared configuration for every core tool.

use std::path::PathBuf;

/// Tunables every core tool handler reads from, supplied by the host.
#[derive(Debug, Clone)]
pub struct CoreToolsConfig {
    pub sandbox_root: PathBuf,
    /// Glob-style host patterns (exact, or `*.suffix`).
    pub allowed_hosts: Vec<String>,
    /// CIDR blocks resolved addresses are checked against; defaults cover
    /// loopback, link-local, RFC1918 private ranges, and the cloud metadata address.
    pub blocked_cidrs: Vec<ipnet::IpNet>,
    pub max_read_bytes: u64,
    pub max_http_bytes: u64,
    pub max_download_bytes: u64,
    pub default_timeout_ms: u64,
    pub http_user_agent: String,
    pub enable_auto_write_large_responses: bool,
    /// New field per the `enableAutoWriteLargeResponses` extension: threshold
    /// above which `CoreAdapter` spills a result to `sandbox_root`.
    pub max_inline_result_bytes: u64,
}

impl Default for CoreToolsConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from("."),
            allowed_hosts: Vec::new(),
            blocked_cidrs: default_blocked_cidrs(),
            max_read_bytes: 10 * 1024 * 1024,
            max_http_bytes: 10 * 1024 * 1024,
            max_download_bytes: 100 * 1024 * 1024,
            default_timeout_ms: 30_000,
            http_user_agent: "toolhub/0.1".to_string(),
            enable_auto_write_large_responses: false,
            max_inline_result_bytes: 256 * 1024,
        }
    }
}

/// Loopback, link-local, RFC1918 private ranges, and the cloud metadata address.
#[must_use]
pub fn default_blocked_cidrs() -> Vec<ipnet::IpNet> {
    [
        "127.0.0.0/8",
        "::1/128",
        "169.254.0.0/16",
        "fe80::/10",
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
    ]
    .iter()
    .map(|s| s.parse().expect("static CIDR literal"))
    .collect()
}
