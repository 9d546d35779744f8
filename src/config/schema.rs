//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Values are raw here; `validation.rs` turns them into typed settings.

use serde::{Deserialize, Serialize};

/// Default hosted API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.dodgeballhq.com/";

/// Root configuration for the Dodgeball client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DodgeballConfig {
    /// API version segment inserted into every URL (only "v1" today).
    pub api_version: String,

    /// Base URL of the API. Self-hosted deployments override this.
    pub api_url: String,

    /// Minimum severity the client logs (TRACE, INFO, ERROR).
    pub log_level: String,

    /// When false, checkpoints are approved locally without any network call.
    pub is_enabled: bool,

    /// Per-request transport deadline in milliseconds. None waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DodgeballConfig {
    fn default() -> Self {
        Self {
            api_version: "v1".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            log_level: "TRACE".to_string(),
            is_enabled: true,
            request_timeout_ms: None,
        }
    }
}
