//! Configuration validation.
//!
//! # Responsibilities
//! - Require a secret key
//! - Map `api_version` and `log_level` onto their recognized values
//! - Check that `api_url` is an absolute URL
//!
//! # Design Decisions
//! - Validation is a pure function: DodgeballConfig → Result<ValidatedConfig, ConfigError>
//! - Runs once, before the client is constructed; the result is immutable

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::DodgeballConfig;
use crate::observability::logging::LogLevel;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not supplied.
    #[error("Missing configuration: {field}")]
    MissingConfig { field: &'static str },

    /// A setting holds a value outside its recognized set.
    #[error("Invalid configuration: {field} = {value:?}, expected one of {allowed:?}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        allowed: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Recognized API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
}

impl ApiVersion {
    pub const ALL: &'static [ApiVersion] = &[ApiVersion::V1];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidConfig {
                field: "config.apiVersion",
                value: s.to_string(),
                allowed: ApiVersion::ALL.iter().map(|v| v.as_str().to_string()).collect(),
            })
    }
}

/// Configuration after validation. Read-only and shared by every call.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub api_version: ApiVersion,
    pub api_url: url::Url,
    pub log_level: LogLevel,
    pub is_enabled: bool,
    pub request_timeout: Option<Duration>,
}

/// Check the secret key and the raw configuration.
pub fn validate_config(secret_key: &str, config: &DodgeballConfig) -> Result<ValidatedConfig, ConfigError> {
    if secret_key.trim().is_empty() {
        return Err(ConfigError::MissingConfig { field: "secretApiKey" });
    }

    let api_version: ApiVersion = config.api_version.parse()?;
    let log_level: LogLevel = config.log_level.parse()?;

    let api_url = url::Url::parse(&config.api_url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| ConfigError::InvalidConfig {
            field: "config.apiUrl",
            value: config.api_url.clone(),
            allowed: vec!["an absolute http(s) URL".to_string()],
        })?;

    Ok(ValidatedConfig {
        api_version,
        api_url,
        log_level,
        is_enabled: config.is_enabled,
        request_timeout: config.request_timeout_ms.map(Duration::from_millis),
    })
}
