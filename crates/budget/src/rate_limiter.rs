//! Sliding-window rate limiter, one instance per tool name.
//!
//! Generalizes the teacher-adjacent `rust_agency::safety::RateLimiter` token
//! bucket (fixed refill rate per named operation) to the spec's exact
//! sliding-window semantics: up to `max_calls` within the trailing `window`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window limiter: at most `max_calls` admitted timestamps within `window`.
pub struct RateLimiter {
    window: Duration,
    max_calls: usize,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_calls: usize, window_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            max_calls,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Attempt to admit a call now. Evicts timestamps older than the window,
    /// then admits iff fewer than `max_calls` remain.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();
        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        if timestamps.len() < self.max_calls {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    pub fn reset(&self) {
        self.timestamps.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_calls_then_rejects() {
        let limiter = RateLimiter::new(2, 1_000);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn resumes_after_window_elapses() {
        let limiter = RateLimiter::new(1, 20);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn reset_clears_history() {
        let limiter = RateLimiter::new(1, 1_000);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        limiter.reset();
        assert!(limiter.try_acquire());
    }
}
