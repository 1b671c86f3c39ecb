//! Unified error type for the toolhub runtime.
//!
//! Keeps the teacher's shape (one `thiserror` enum, `impl` constructors per
//! variant) but closes the variant set over the error kinds the spec requires
//! every invocation boundary to report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The closed set of error kinds a [`ToolResult`](crate::ToolResult) can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ToolNotFound,
    InputSchemaInvalid,
    PolicyDenied,
    BudgetExceeded,
    Timeout,
    UpstreamError,
    OutputSchemaInvalid,
    PathOutsideSandbox,
    FileTooLarge,
    HttpDisallowedHost,
    HttpTimeout,
    HttpTooLarge,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorKind::InputSchemaInvalid => "INPUT_SCHEMA_INVALID",
            ErrorKind::PolicyDenied => "POLICY_DENIED",
            ErrorKind::BudgetExceeded => "BUDGET_EXCEEDED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::OutputSchemaInvalid => "OUTPUT_SCHEMA_INVALID",
            ErrorKind::PathOutsideSandbox => "PATH_OUTSIDE_SANDBOX",
            ErrorKind::FileTooLarge => "FILE_TOO_LARGE",
            ErrorKind::HttpDisallowedHost => "HTTP_DISALLOWED_HOST",
            ErrorKind::HttpTimeout => "HTTP_TIMEOUT",
            ErrorKind::HttpTooLarge => "HTTP_TOO_LARGE",
        };
        f.write_str(s)
    }
}

/// Tagged error value carried by a failed [`ToolResult`](crate::ToolResult).
///
/// The core never throws this to its caller: every error is captured at the
/// invocation boundary (`Runtime::invoke_tool`) into `ToolResult{ok:false, error}`.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorKind::ToolNotFound, format!("unknown tool: {name}"))
    }

    pub fn input_schema_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputSchemaInvalid, message)
    }

    /// Policy denial listing the missing capabilities by name, as the spec's
    /// testable properties require (`message lists write:fs`).
    pub fn policy_denied(missing: &[crate::Capability]) -> Self {
        let names = missing
            .iter()
            .map(crate::Capability::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorKind::PolicyDenied,
            format!("missing required capabilities: {names}"),
        )
    }

    pub fn policy_denied_reason(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyDenied, message)
    }

    pub fn budget_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BudgetExceeded, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamError, message)
    }

    pub fn output_schema_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutputSchemaInvalid, message)
    }

    pub fn path_outside_sandbox(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathOutsideSandbox, message)
    }

    pub fn file_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileTooLarge, message)
    }

    pub fn http_disallowed_host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpDisallowedHost, message)
    }

    pub fn http_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpTimeout, message)
    }

    pub fn http_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpTooLarge, message)
    }
}
