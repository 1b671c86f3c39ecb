//! Budget mechanisms gating tool invocation: timeout, rate limiting,
//! bulkhead concurrency caps, and a consecutive-failure circuit breaker.

pub mod budget;
pub mod bulkhead;
pub mod circuit_breaker;
pub mod rate_limiter;
pub mod timeout;

pub use budget::{BudgetConfig, BudgetRegistry, ToolBudget};
pub use bulkhead::Bulkhead;
pub use circuit_breaker::{Admission, CircuitBreaker};
pub use rate_limiter::RateLimiter;
pub use timeout::{with_deadline, DEFAULT_TIMEOUT_MS};
