//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! checkpoint engine produces:
//!     → logging.rs (structured events, gated by the client's Logger)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (one span per checkpoint call, with a call ID)
//!
//! Consumers:
//!     → whatever tracing subscriber / metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted messages
//! - No process-wide severity state in the library
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::{LogLevel, Logger};
