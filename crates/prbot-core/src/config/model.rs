//! Configuration data model

use crate::error::{BotError, BotResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What to do once `max_idle_wait` elapses while a restart is still waiting
/// for the idle predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdleTimeoutAction {
    /// Restart anyway
    #[default]
    ForceRestart,
    /// Log a warning once and keep polling
    KeepWaiting,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Configuration for the bot supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Label attached to every supervisor log line
    pub name: String,
    /// Directories watched recursively for source changes
    pub watch_paths: Vec<PathBuf>,
    /// Extra ignore regexes, added to the built-in set
    pub ignore_patterns: Vec<String>,
    /// Quiet period after the last change before a restart is queued
    #[serde(with = "humantime_serde")]
    pub debounce_delay: Duration,
    /// How often the idle predicate is polled while a restart waits
    #[serde(with = "humantime_serde")]
    pub idle_check_interval: Duration,
    /// Upper bound on the idle poll; `None` polls until idle or stopped
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_idle_wait: Option<Duration>,
    /// Behaviour when `max_idle_wait` elapses
    pub idle_timeout_action: IdleTimeoutAction,
    /// Silence required before the activity indicator reports idle
    #[serde(with = "humantime_serde")]
    pub idle_hysteresis: Duration,
    /// Stream stabilizer sampling tick
    #[serde(with = "humantime_serde")]
    pub sample_interval: Duration,
    /// Virtual terminal width
    pub terminal_cols: u16,
    /// Virtual terminal height
    pub terminal_rows: u16,
    /// Location of the JSON state file; defaults under the user data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            name: "restart-manager".to_string(),
            watch_paths: vec![PathBuf::from("src")],
            ignore_patterns: Vec::new(),
            debounce_delay: Duration::from_millis(1000),
            idle_check_interval: Duration::from_millis(5000),
            max_idle_wait: None,
            idle_timeout_action: IdleTimeoutAction::default(),
            idle_hysteresis: Duration::from_millis(5000),
            sample_interval: Duration::from_millis(1000),
            terminal_cols: 120,
            terminal_rows: 40,
            store_path: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl SupervisorConfig {
    /// Resolve the state file location
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("prbot")
                .join("state.json")
        })
    }

    /// Check the configuration for values the supervisor cannot run with
    pub fn validate(&self) -> BotResult<()> {
        if self.watch_paths.is_empty() {
            return Err(BotError::invalid_field(
                "watch_paths",
                "at least one watch path is required",
            ));
        }

        let durations = [
            ("debounce_delay", self.debounce_delay),
            ("idle_check_interval", self.idle_check_interval),
            ("idle_hysteresis", self.idle_hysteresis),
            ("sample_interval", self.sample_interval),
        ];
        for (field, value) in durations {
            if value.is_zero() {
                return Err(BotError::invalid_field(field, "must be greater than zero"));
            }
        }

        if self.max_idle_wait.is_some_and(|d| d.is_zero()) {
            return Err(BotError::invalid_field(
                "max_idle_wait",
                "must be greater than zero when set",
            ));
        }

        if self.terminal_cols == 0 || self.terminal_rows == 0 {
            return Err(BotError::invalid_field(
                "terminal_cols",
                "terminal size must be non-zero",
            ));
        }

        for pattern in &self.ignore_patterns {
            Regex::new(pattern)?;
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> BotResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
