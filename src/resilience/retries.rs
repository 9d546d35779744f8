//! Retry logic.
//!
//! # Responsibilities
//! - Bound the number of attempts for an operation that may produce nothing
//! - Report how many attempts were spent
//!
//! # Design Decisions
//! - Submission retries are immediate; only polling backs off
//! - Only "no result at all" is retried; a produced result ends the loop,
//!   whatever it says

use std::future::Future;

/// Maximum submission attempts, and maximum failed polls per call.
pub const MAX_RETRY_COUNT: u32 = 3;

/// Result of a bounded retry loop.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Run `op` until it returns `Ok` or `max_attempts` is reached, without
/// waiting between attempts. `op` receives the 1-based attempt number.
pub async fn retry_immediately<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Attempted<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = op(attempt).await;
        if result.is_ok() || attempt >= max_attempts {
            return Attempted { result, attempts: attempt };
        }
    }
}
