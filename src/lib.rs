//! Dodgeball checkpoint client.
//!
//! Submits checkpoints to the Dodgeball risk-verification API and turns
//! its asynchronous verifications into a single awaited result.
//!
//! ```text
//! caller ──▶ checkpoint::Dodgeball ──▶ http::request (URL, headers)
//!                  │                  └▶ http::transport (reqwest)
//!                  │
//!                  ├─ resilience (retry, backoff)
//!                  ├─ observability (tracing, metrics)
//!                  └─ config (TOML, validation)
//!
//! response ──▶ checkpoint::outcome (Decision)
//! ```

pub mod checkpoint;
pub mod config;
pub mod http;
pub mod observability;
pub mod resilience;

pub use checkpoint::{
    CheckpointError, CheckpointEvent, CheckpointOptions, CheckpointRequest, CheckpointResponse, Decision, Dodgeball,
};
pub use config::{ConfigError, DodgeballConfig};
pub use observability::LogLevel;
