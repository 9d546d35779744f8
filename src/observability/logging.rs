//! Structured logging.
//!
//! # Responsibilities
//! - Define the recognized client log levels
//! - Gate client log events by a per-client threshold
//! - Initialize the tracing subscriber for binaries
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The threshold lives on a `Logger` value owned by each client, so two
//!   clients in one process can log at different levels
//! - The global subscriber still decides where events go

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::validation::ConfigError;

/// Client log severity. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Info,
    Error,
}

impl LogLevel {
    pub const ALL: &'static [LogLevel] = &[LogLevel::Trace, LogLevel::Info, LogLevel::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidConfig {
                field: "config.logLevel",
                value: s.to_string(),
                allowed: LogLevel::ALL.iter().map(|l| l.as_str().to_string()).collect(),
            })
    }
}

/// Severity gate owned by a client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    threshold: LogLevel,
}

impl Logger {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// True when events at `level` should be emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

/// Emit a tracing event when the given `Logger` lets the level through.
/// `warn` events are transient failures and share the INFO threshold.
macro_rules! log_at {
    ($logger:expr, trace, $($arg:tt)+) => {
        if $logger.enabled($crate::observability::logging::LogLevel::Trace) {
            ::tracing::trace!($($arg)+);
        }
    };
    ($logger:expr, info, $($arg:tt)+) => {
        if $logger.enabled($crate::observability::logging::LogLevel::Info) {
            ::tracing::info!($($arg)+);
        }
    };
    ($logger:expr, warn, $($arg:tt)+) => {
        if $logger.enabled($crate::observability::logging::LogLevel::Info) {
            ::tracing::warn!($($arg)+);
        }
    };
    ($logger:expr, error, $($arg:tt)+) => {
        if $logger.enabled($crate::observability::logging::LogLevel::Error) {
            ::tracing::error!($($arg)+);
        }
    };
}

pub(crate) use log_at;

/// Install a fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: LogLevel) {
    let fallback = format!("dodgeball_client={}", default_level.as_filter_directive());
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
