//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DodgeballConfig;
use crate::config::validation::ConfigError;

/// Load configuration from a TOML file.
///
/// Only syntax is checked here; `Dodgeball::new` validates the values.
pub fn load_config(path: &Path) -> Result<DodgeballConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: DodgeballConfig = toml::from_str(&content)?;

    tracing::debug!(path = %path.display(), api_url = %config.api_url, "Loaded configuration");

    Ok(config)
}
