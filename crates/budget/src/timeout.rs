//! Per-call deadline enforcement.

use std::future::Future;
use std::time::Duration;

use toolhub_core::ToolError;

/// Default timeout applied when neither the context nor the tool config override it.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Run `fut` under a deadline of `timeout_ms`, converting expiry into `TIMEOUT`.
///
/// # Errors
/// Returns `ToolError::timeout` if `fut` does not complete within `timeout_ms`.
pub async fn with_deadline<F, T>(timeout_ms: u64, fut: F) -> Result<T, ToolError>
where
    F: Future<Output = Result<T, ToolError>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(ToolError::timeout(format!(
            "exceeded deadline of {timeout_ms}ms"
        ))),
    }
}

/// Resolve the effective timeout: the context override if present, else the default.
#[must_use]
pub fn effective_timeout_ms(ctx_timeout_ms: Option<u64>, default_timeout_ms: u64) -> u64 {
    ctx_timeout_ms.unwrap_or(default_timeout_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let result = with_deadline(1_000, async { Ok::<_, ToolError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn expiry_maps_to_timeout_kind() {
        let result = with_deadline(10, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ToolError>(())
        })
        .await;
        assert_eq!(result.unwrap_err().kind, toolhub_core::ErrorKind::Timeout);
    }

    #[test]
    fn effective_timeout_prefers_context_override() {
        assert_eq!(effective_timeout_ms(Some(500), DEFAULT_TIMEOUT_MS), 500);
        assert_eq!(effective_timeout_ms(None, DEFAULT_TIMEOUT_MS), DEFAULT_TIMEOUT_MS);
    }
}
