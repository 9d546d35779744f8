//! Metrics collection.
//!
//! # Metrics
//! - `dodgeball_submissions_total` (counter): submission results by `result`
//! - `dodgeball_submission_attempts` (histogram): attempts per submission
//! - `dodgeball_polls_total` (counter): poll results by `result`
//! - `dodgeball_retry_exhausted_total` (counter): polling loops that hit the failure cap
//! - `dodgeball_checkpoints_total` (counter): returned decisions by `decision`
//! - `dodgeball_checkpoint_duration_seconds` (histogram): end-to-end call latency
//!
//! # Design Decisions
//! - The library only records; installing an exporter is the embedding
//!   application's choice

use std::time::Instant;

/// Record the result of the submission phase.
pub fn record_submission(result: &'static str, attempts: u32) {
    metrics::counter!("dodgeball_submissions_total", "result" => result).increment(1);
    metrics::histogram!("dodgeball_submission_attempts").record(attempts as f64);
}

/// Record one poll of the verification endpoint.
pub fn record_poll(result: &'static str) {
    metrics::counter!("dodgeball_polls_total", "result" => result).increment(1);
}

/// Record a polling loop that gave up after too many failures.
pub fn record_retry_exhausted() {
    metrics::counter!("dodgeball_retry_exhausted_total").increment(1);
}

/// Record the decision handed back to the caller.
pub fn record_checkpoint(decision: &'static str, start: Instant) {
    metrics::counter!("dodgeball_checkpoints_total", "decision" => decision).increment(1);
    metrics::histogram!("dodgeball_checkpoint_duration_seconds").record(start.elapsed().as_secs_f64());
}
