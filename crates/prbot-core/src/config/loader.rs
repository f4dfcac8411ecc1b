//! Configuration loading from files and the environment

use super::env_loader::apply_env;
use super::model::SupervisorConfig;
use crate::error::{BotError, BotResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a TOML file
    File(PathBuf),
    /// Configuration from `PRBOT_*` environment variables
    Environment,
}

/// Layered configuration loader
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a loader that starts from defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources
            .push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add environment variables source
    pub fn with_env(mut self) -> Self {
        self.sources.push(ConfigSource::Environment);
        self
    }

    /// Apply every source in order and validate the result
    pub fn load(self) -> BotResult<SupervisorConfig> {
        let mut config = SupervisorConfig::default();

        for source in &self.sources {
            match source {
                ConfigSource::File(path) => {
                    config = load_from_file(path)?;
                    tracing::debug!(path = %path.display(), "loaded configuration file");
                }
                ConfigSource::Environment => apply_env(&mut config)?,
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Read a TOML configuration file; missing keys fall back to defaults
pub fn load_from_file(path: &Path) -> BotResult<SupervisorConfig> {
    let raw = fs::read_to_string(path).map_err(|e| {
        BotError::io_with_path(
            format!("failed to read config file: {}", e),
            path.display().to_string(),
        )
    })?;

    toml::from_str(&raw)
        .map_err(|e| BotError::config_with_context(e.to_string(), path.display().to_string()))
}
