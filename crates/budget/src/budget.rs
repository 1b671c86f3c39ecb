//! Per-tool composite budget: rate limiter → bulkhead → circuit breaker → deadline.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use toolhub_core::ToolError;

use crate::bulkhead::Bulkhead;
use crate::circuit_breaker::{Admission, CircuitBreaker};
use crate::rate_limiter::RateLimiter;
use crate::timeout::{self, DEFAULT_TIMEOUT_MS};

/// Construction parameters for a tool's budget, sourced from config.
#[derive(Debug, Clone, Copy)]
pub struct BudgetConfig {
    pub max_calls: usize,
    pub window_ms: u64,
    pub max_concurrency: usize,
    pub breaker_threshold: u32,
    pub half_open_after_ms: u64,
    pub default_timeout_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_calls: 60,
            window_ms: 60_000,
            max_concurrency: 8,
            breaker_threshold: 5,
            half_open_after_ms: 30_000,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// The composed rate limiter, bulkhead, and circuit breaker for one tool name.
pub struct ToolBudget {
    rate_limiter: RateLimiter,
    bulkhead: Bulkhead,
    breaker: CircuitBreaker,
    default_timeout_ms: u64,
}

impl ToolBudget {
    #[must_use]
    pub fn new(config: BudgetConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config.max_calls, config.window_ms),
            bulkhead: Bulkhead::new(config.max_concurrency),
            breaker: CircuitBreaker::new(config.breaker_threshold, config.half_open_after_ms),
            default_timeout_ms: config.default_timeout_ms,
        }
    }

    pub fn reset(&self) {
        self.rate_limiter.reset();
        self.breaker.reset();
    }

    /// Run `call` under the composed budget: rate limit, then bulkhead
    /// admission, then breaker gating (`breaker(bulkhead(call))`), then the
    /// per-call deadline.
    ///
    /// # Errors
    /// `BUDGET_EXCEEDED` if the rate limit, bulkhead, or breaker reject the
    /// call; `TIMEOUT` if the call does not finish within the deadline;
    /// otherwise the call's own error.
    pub async fn execute<F, Fut, T>(&self, ctx_timeout_ms: Option<u64>, call: F) -> Result<T, ToolError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ToolError>>,
    {
        if !self.rate_limiter.try_acquire() {
            return Err(ToolError::budget_exceeded("rate limit exceeded"));
        }

        let Some(_permit) = self.bulkhead.try_acquire() else {
            return Err(ToolError::budget_exceeded("bulkhead at capacity"));
        };

        let admission = self.breaker.try_admit();
        if admission == Admission::Rejected {
            return Err(ToolError::budget_exceeded("circuit breaker open"));
        }

        let deadline = timeout::effective_timeout_ms(ctx_timeout_ms, self.default_timeout_ms);
        let result = timeout::with_deadline(deadline, call()).await;

        match &result {
            Ok(_) => self.breaker.on_success(),
            Err(e) if e.kind == toolhub_core::ErrorKind::Timeout => self.breaker.on_failure(),
            Err(_) => self.breaker.on_failure(),
        }

        result
    }
}

/// Lazily-instantiated per-tool [`ToolBudget`]s.
#[derive(Default)]
pub struct BudgetRegistry {
    budgets: DashMap<String, Arc<ToolBudget>>,
    default_config: BudgetConfig,
}

impl BudgetRegistry {
    #[must_use]
    pub fn new(default_config: BudgetConfig) -> Self {
        Self {
            budgets: DashMap::new(),
            default_config,
        }
    }

    #[must_use]
    pub fn get_or_create(&self, tool_name: &str) -> Arc<ToolBudget> {
        self.budgets
            .entry(tool_name.to_string())
            .or_insert_with(|| Arc::new(ToolBudget::new(self.default_config)))
            .clone()
    }

    pub fn reset(&self, tool_name: &str) {
        if let Some(budget) = self.budgets.get(tool_name) {
            budget.reset();
        }
    }

    pub fn reset_all(&self) {
        for entry in &self.budgets {
            entry.value().reset();
        }
    }
}
