//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Submission:
//!     → retries.rs (up to MAX_RETRY_COUNT immediate attempts while nothing comes back)
//! Polling:
//!     → backoff.rs (sleep, then double the interval up to MAX_TIMEOUT_MS)
//!     → failure counter in the resolution session (stop at MAX_RETRY_COUNT)
//! ```
//!
//! # Design Decisions
//! - No jitter: interval growth is part of the observable latency contract
//! - Transport failures never escape as errors; callers see data

pub mod backoff;
pub mod retries;

pub use backoff::{next_backoff, BASE_CHECKPOINT_TIMEOUT_MS, MAX_TIMEOUT_MS};
pub use retries::{retry_immediately, Attempted, MAX_RETRY_COUNT};
