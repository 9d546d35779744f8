//! Checkpoint subsystem.
//!
//! # Data Flow
//! ```text
//! CheckpointRequest
//!     → types.rs (parameter validation)
//!     → session.rs (timeout classification: trivial / moderate / large)
//!     → engine.rs (submit with retries, poll with backoff)
//!     → CheckpointResponse
//!     → outcome.rs (Decision + is_allowed / is_denied / ... predicates)
//! ```
//!
//! # Design Decisions
//! - Network failures are data, never errors
//! - Each call owns its session; nothing is shared between calls except
//!   read-only configuration

pub mod engine;
pub mod outcome;
pub mod session;
pub mod types;

pub use engine::Dodgeball;
pub use outcome::Decision;
pub use session::ResolutionSession;
pub use types::{
    ApiError, CheckpointError, CheckpointEvent, CheckpointOptions, CheckpointRequest, CheckpointResponse,
    Verification, VerificationOutcome, VerificationStatus, Webhook,
};
