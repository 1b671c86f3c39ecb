//! Levelled logger layered over `tracing`, with secret redaction.
//!
//! Grounded on the teacher's `agentic_logging` crate: this keeps its
//! env-var-driven on/off switch (`AGENTIC_LOGGING_DISABLED` generalizes to
//! `TOOLHUB_LOG_LEVEL`/`TOOLHUB_DEBUG`/`DEBUG`) but emits through
//! `tracing::event!` instead of hand-rolled JSONL files, since every teacher
//! binary already initializes a `tracing_subscriber` at startup.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Log verbosity, ordered `Silent < Error < Warn < Info < Debug < Trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Some(LogLevel::Silent),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Resolve the effective level from `TOOLHUB_LOG_LEVEL`, then
    /// `TOOLHUB_DEBUG`/`DEBUG` (truthy strings imply `Debug`, or a named
    /// level string is honoured verbatim), defaulting to `Info`.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(v) = std::env::var("TOOLHUB_LOG_LEVEL") {
            if let Some(level) = Self::parse(&v) {
                return level;
            }
        }
        for var in ["TOOLHUB_DEBUG", "DEBUG"] {
            if let Ok(v) = std::env::var(var) {
                if let Some(level) = Self::parse(&v) {
                    return level;
                }
                if matches!(v.as_str(), "1" | "true" | "yes" | "on") {
                    return LogLevel::Debug;
                }
            }
        }
        LogLevel::Info
    }
}

fn secret_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)password|token|secret|key|auth").expect("static redaction pattern")
    })
}

/// Replace the value of any object key matching the secret pattern with `"[REDACTED]"`.
#[must_use]
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if secret_key_pattern().is_match(k) {
                    out.insert(k.clone(), Value::String("[REDACTED]".into()));
                } else {
                    out.insert(k.clone(), redact(v));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Which optional fields a tool-invocation log record includes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFields {
    pub include_args: bool,
    pub include_result: bool,
    pub include_raw: bool,
}

/// Thin wrapper over `tracing` honouring a resolved [`LogLevel`] and redacting
/// secrets out of any structured payload before emission.
pub struct Logger {
    level: LogLevel,
    fields: LogFields,
}

impl Logger {
    #[must_use]
    pub fn new(level: LogLevel, fields: LogFields) -> Self {
        Self { level, fields }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LogLevel::from_env(), LogFields::default())
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn enabled(&self, at: LogLevel) -> bool {
        self.level >= at
    }

    pub fn log_invocation(
        &self,
        tool_name: &str,
        args: &Value,
        result: Option<&Value>,
        raw: Option<&Value>,
    ) {
        if !self.enabled(LogLevel::Info) {
            return;
        }
        let args = if self.fields.include_args {
            Some(redact(args))
        } else {
            None
        };
        let result = if self.fields.include_result {
            result.map(redact)
        } else {
            None
        };
        let raw = if self.fields.include_raw {
            raw.map(redact)
        } else {
            None
        };
        tracing::info!(
            tool.name = tool_name,
            args = args.map(|v| v.to_string()).unwrap_or_default(),
            result = result.map(|v| v.to_string()).unwrap_or_default(),
            raw = raw.map(|v| v.to_string()).unwrap_or_default(),
            "tool invocation"
        );
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!("{message}");
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Warn) {
            tracing::warn!("{message}");
        }
    }

    pub fn error(&self, message: &str) {
        if self.enabled(LogLevel::Error) {
            tracing::error!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn redacts_secret_like_keys_recursively() {
        let input = serde_json::json!({
            "username": "alice",
            "password": "hunter2",
            "nested": { "api_key": "abc123", "note": "fine" },
        });
        let redacted = redact(&input);
        assert_eq!(redacted["password"], serde_json::json!("[REDACTED]"));
        assert_eq!(redacted["nested"]["api_key"], serde_json::json!("[REDACTED]"));
        assert_eq!(redacted["username"], serde_json::json!("alice"));
        assert_eq!(redacted["nested"]["note"], serde_json::json!("fine"));
    }

    #[test]
    #[serial]
    fn level_from_env_prefers_toolhub_log_level() {
        // SAFETY: serial_test serializes env-mutating tests in this module.
        unsafe {
            std::env::set_var("TOOLHUB_LOG_LEVEL", "trace");
            std::env::remove_var("TOOLHUB_DEBUG");
            std::env::remove_var("DEBUG");
        }
        assert_eq!(LogLevel::from_env(), LogLevel::Trace);
        unsafe {
            std::env::remove_var("TOOLHUB_LOG_LEVEL");
        }
    }

    #[test]
    #[serial]
    fn truthy_debug_env_implies_debug_level() {
        // SAFETY: serial_test serializes env-mutating tests in this module.
        unsafe {
            std::env::remove_var("TOOLHUB_LOG_LEVEL");
            std::env::set_var("TOOLHUB_DEBUG", "1");
        }
        assert_eq!(LogLevel::from_env(), LogLevel::Debug);
        unsafe {
            std::env::remove_var("TOOLHUB_DEBUG");
        }
    }

    #[test]
    #[serial]
    fn default_level_is_info() {
        // SAFETY: serial_test serializes env-mutating tests in this module.
        unsafe {
            std::env::remove_var("TOOLHUB_LOG_LEVEL");
            std::env::remove_var("TOOLHUB_DEBUG");
            std::env::remove_var("DEBUG");
        }
        assert_eq!(LogLevel::from_env(), LogLevel::Info);
    }
}
