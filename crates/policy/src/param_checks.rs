//! Parameter-level checks, selected by a spec's declared capabilities.

use serde_json::Value;
use toolhub_core::ToolError;

use crate::config::{PolicyConfig, FS_PATH_KEYS, SQL_KEYS, URL_KEYS};
use crate::extract::extract_strings_by_key;

/// `write:fs`: reject literal `..` path-traversal substrings, and (if
/// `sandbox_paths` is configured) require every path to prefix-match one of them.
///
/// # Errors
/// `POLICY_DENIED` naming the offending path.
pub fn check_write_fs(args: &Value, config: &PolicyConfig) -> Result<(), ToolError> {
    for path in extract_strings_by_key(args, FS_PATH_KEYS) {
        if path.contains("..") {
            return Err(ToolError::policy_denied_reason(format!(
                "path '{path}' contains a traversal sequence"
            )));
        }
        if !config.sandbox_paths.is_empty()
            && !config.sandbox_paths.iter().any(|root| path.starts_with(root.as_str()))
        {
            return Err(ToolError::policy_denied_reason(format!(
                "path '{path}' is outside the configured sandbox paths"
            )));
        }
    }
    Ok(())
}

/// `network` / `read:web`: deny-list, then (if non-empty) allow-list, then
/// (if configured) an `allowed_domains` host-suffix check.
///
/// # Errors
/// `POLICY_DENIED` naming the offending URL.
pub fn check_network(args: &Value, config: &PolicyConfig) -> Result<(), ToolError> {
    for url in extract_strings_by_key(args, URL_KEYS) {
        if config.deny_url_regexes.iter().any(|re| re.is_match(&url)) {
            return Err(ToolError::policy_denied_reason(format!(
                "url '{url}' matches a deny rule"
            )));
        }
        if !config.allow_url_regexes.is_empty()
            && !config.allow_url_regexes.iter().any(|re| re.is_match(&url))
        {
            return Err(ToolError::policy_denied_reason(format!(
                "url '{url}' does not match any allow rule"
            )));
        }
        if !config.allowed_domains.is_empty() {
            let host = url::Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string));
            let Some(host) = host else {
                return Err(ToolError::policy_denied_reason(format!(
                    "url '{url}' has no parseable host"
                )));
            };
            let allowed = config.allowed_domains.iter().any(|domain| {
                host == *domain || host.ends_with(&format!(".{domain}"))
            });
            if !allowed {
                return Err(ToolError::policy_denied_reason(format!(
                    "host '{host}' is not in the allowed domains list"
                )));
            }
        }
    }
    Ok(())
}

/// `read:db` / `write:db`: reject SQL matching any configured deny pattern.
///
/// # Errors
/// `POLICY_DENIED` naming the offending statement.
pub fn check_db(args: &Value, config: &PolicyConfig) -> Result<(), ToolError> {
    for sql in extract_strings_by_key(args, SQL_KEYS) {
        if config.sql_deny_regexes.iter().any(|re| re.is_match(&sql)) {
            return Err(ToolError::policy_denied_reason(format!(
                "statement '{sql}' matches a denied SQL pattern"
            )));
        }
    }
    Ok(())
}
