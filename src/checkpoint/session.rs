//! Per-call resolution state.
//!
//! Built from the caller's requested timeout before any network call,
//! mutated only by the polling loop, dropped when the call returns.

use std::time::Duration;

use crate::resilience::{next_backoff, BASE_CHECKPOINT_TIMEOUT_MS, MAX_RETRY_COUNT, MAX_TIMEOUT_MS};

/// Timeouts above this many base quanta cannot be honored by one remote call.
const LARGE_TIMEOUT_FACTOR: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSession {
    /// Caller's timeout in milliseconds, 0 when none was requested.
    caller_timeout_ms: i64,
    active_timeout: Duration,
    max_timeout: Duration,
    repeats: u32,
    failures: u32,
    trivial_timeout: bool,
    large_timeout: bool,
}

impl ResolutionSession {
    pub fn new(requested_timeout_ms: Option<i64>) -> Self {
        let base = BASE_CHECKPOINT_TIMEOUT_MS as i64;
        let trivial_timeout = requested_timeout_ms.map_or(true, |t| t <= 0);
        let large_timeout = requested_timeout_ms.is_some_and(|t| t > LARGE_TIMEOUT_FACTOR * base);
        let must_poll = trivial_timeout || large_timeout;

        let active_ms = match requested_timeout_ms {
            Some(t) if !must_poll => t as u64,
            _ => BASE_CHECKPOINT_TIMEOUT_MS,
        };

        Self {
            caller_timeout_ms: requested_timeout_ms.unwrap_or(0).max(0),
            active_timeout: Duration::from_millis(active_ms),
            max_timeout: Duration::from_millis(MAX_TIMEOUT_MS),
            repeats: 0,
            failures: 0,
            trivial_timeout,
            large_timeout,
        }
    }

    /// Trivial or large timeouts are resolved by engine-side polling; a
    /// moderate timeout is handed to the API as its own deadline.
    pub fn must_poll(&self) -> bool {
        self.trivial_timeout || self.large_timeout
    }

    pub fn is_trivial_timeout(&self) -> bool {
        self.trivial_timeout
    }

    pub fn is_large_timeout(&self) -> bool {
        self.large_timeout
    }

    pub fn active_timeout(&self) -> Duration {
        self.active_timeout
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Submission attempts count against the time budget.
    pub fn record_submission_attempts(&mut self, attempts: u32) {
        self.repeats = attempts;
    }

    /// No requested timeout means no time bound; otherwise the caller's
    /// timeout must exceed `repeats × active_timeout`.
    pub fn within_time_budget(&self) -> bool {
        if self.trivial_timeout {
            return true;
        }
        let spent = self.repeats as i128 * self.active_timeout.as_millis() as i128;
        self.caller_timeout_ms as i128 > spent
    }

    pub fn retries_exhausted(&self) -> bool {
        self.failures >= MAX_RETRY_COUNT
    }

    /// Loop guard for the polling phase.
    pub fn should_poll(&self, resolved: bool) -> bool {
        self.within_time_budget() && !resolved && !self.retries_exhausted()
    }

    /// Interval to sleep before the next poll. Doubles the active timeout,
    /// capped at the ceiling, for the poll after that.
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.active_timeout;
        self.active_timeout = next_backoff(self.active_timeout, self.max_timeout);
        wait
    }

    pub fn record_poll_success(&mut self) {
        self.repeats += 1;
    }

    pub fn record_poll_failure(&mut self) {
        self.failures += 1;
    }
}
