//! Consecutive-failure circuit breaker with a single-trial half-open state.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy)]
enum State {
    Closed { consecutive_failures: u32 },
    Open { opened_at: Instant },
    /// Open past `half_open_after`, admitting exactly one trial call.
    HalfOpenTrialInFlight,
}

/// Opens after `threshold` consecutive adapter failures; admits a single
/// trial call after `half_open_after` has elapsed since opening.
pub struct CircuitBreaker {
    threshold: u32,
    half_open_after: Duration,
    state: Mutex<State>,
}

/// Outcome of [`CircuitBreaker::try_admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The call may proceed normally.
    Admitted,
    /// The call may proceed as the single half-open trial; its outcome
    /// must be reported via `on_success`/`on_failure`.
    AdmittedAsTrial,
    /// The breaker is open; the call must not be attempted.
    Rejected,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(threshold: u32, half_open_after_ms: u64) -> Self {
        Self {
            threshold,
            half_open_after: Duration::from_millis(half_open_after_ms),
            state: Mutex::new(State::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    pub fn try_admit(&self) -> Admission {
        let mut state = self.state.lock();
        match *state {
            State::Closed { .. } => Admission::Admitted,
            State::Open { opened_at } => {
                if opened_at.elapsed() >= self.half_open_after {
                    *state = State::HalfOpenTrialInFlight;
                    Admission::AdmittedAsTrial
                } else {
                    Admission::Rejected
                }
            }
            State::HalfOpenTrialInFlight => Admission::Rejected,
        }
    }

    pub fn on_success(&self) {
        let mut state = self.state.lock();
        *state = State::Closed {
            consecutive_failures: 0,
        };
    }

    pub fn on_failure(&self) {
        let mut state = self.state.lock();
        *state = match *state {
            State::Closed { consecutive_failures } => {
                let failures = consecutive_failures + 1;
                if failures >= self.threshold {
                    State::Open {
                        opened_at: Instant::now(),
                    }
                } else {
                    State::Closed {
                        consecutive_failures: failures,
                    }
                }
            }
            State::Open { .. } | State::HalfOpenTrialInFlight => State::Open {
                opened_at: Instant::now(),
            },
        };
    }

    pub fn reset(&self) {
        *self.state.lock() = State::Closed {
            consecutive_failures: 0,
        };
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), State::Open { .. })
    }
}
