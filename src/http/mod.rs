//! HTTP plumbing subsystem.
//!
//! # Data Flow
//! ```text
//! checkpoint engine
//!     → request.rs (versioned URL, header set, ApiRequest)
//!     → transport.rs (one HTTP call, JSON decode)
//!     → serde_json::Value or TransportError back to the engine
//! ```

pub mod request;
pub mod transport;

pub use request::{construct_api_headers, construct_api_url, ApiHeaders, ApiRequest, CallIdentity};
pub use transport::{ReqwestTransport, Transport, TransportError};
