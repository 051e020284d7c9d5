//! YAML configuration loading.

use std::path::Path;

use super::error::ConfigError;
use super::types::TimerConfig;

/// Loader for YAML configuration files.
pub struct YamlLoader;

impl YamlLoader {
    /// Load timer configuration from a file.
    pub fn load_timer_config(path: impl AsRef<Path>) -> Result<TimerConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let config: TimerConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlFileError {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), ?config, "Loaded timer configuration");
        Ok(config)
    }

    /// Parse timer configuration from a YAML string.
    pub fn parse_timer_config(yaml: &str) -> Result<TimerConfig, ConfigError> {
        let config: TimerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}
