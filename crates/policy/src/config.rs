//! Configuration for the parameter-level policy checks.

use regex::Regex;

/// Keys (case-insensitive substring match) treated as filesystem path fields.
pub const FS_PATH_KEYS: &[&str] = &["path", "file", "filepath", "filename", "dir", "directory"];

/// Keys (case-insensitive substring match) treated as URL fields.
pub const URL_KEYS: &[&str] = &["url", "uri", "endpoint", "link"];

/// Keys (case-insensitive substring match) treated as SQL fields.
pub const SQL_KEYS: &[&str] = &["sql", "query"];

/// Tunables for the `write:fs` / `network`,`read:web` / `read:db`,`write:db`
/// parameter-level checks.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// If non-empty, every extracted filesystem path must prefix-match one of these.
    pub sandbox_paths: Vec<String>,
    /// Checked before `allow_url_regexes`; any match rejects.
    pub deny_url_regexes: Vec<Regex>,
    /// If non-empty, the URL must match at least one.
    pub allow_url_regexes: Vec<Regex>,
    /// If non-empty, the URL's host must equal or be a dot-joined subdomain of one of these.
    pub allowed_domains: Vec<String>,
    /// SQL statements matching any of these are rejected.
    pub sql_deny_regexes: Vec<Regex>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            sandbox_paths: Vec::new(),
            deny_url_regexes: Vec::new(),
            allow_url_regexes: Vec::new(),
            allowed_domains: Vec::new(),
            sql_deny_regexes: default_sql_deny_regexes(),
        }
    }
}

fn default_sql_deny_regexes() -> Vec<Regex> {
    [r"(?i)DROP\s", r"(?i)TRUNCATE\s", r"(?i)DELETE\s+FROM\s+\w+\s*;?\s*$"]
        .iter()
        .map(|p| Regex::new(p).expect("static SQL deny pattern"))
        .collect()
}
