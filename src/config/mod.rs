//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or DodgeballConfig::default()
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (secret key, api version, log level, url)
//!     → ValidatedConfig (immutable)
//!     → shared via Arc by every checkpoint call
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_config;
pub use schema::DodgeballConfig;
pub use validation::{validate_config, ApiVersion, ConfigError, ValidatedConfig};
