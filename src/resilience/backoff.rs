//! Exponential backoff with a hard ceiling.

use std::time::Duration;

/// Base polling quantum.
pub const BASE_CHECKPOINT_TIMEOUT_MS: u64 = 100;

/// Ceiling for the polling interval.
pub const MAX_TIMEOUT_MS: u64 = 10_000;

/// Next polling interval: double the current one, capped at `max`.
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}
