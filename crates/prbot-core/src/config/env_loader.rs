//! Environment variable overrides

use super::model::SupervisorConfig;
use crate::error::{BotError, BotResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Apply `PRBOT_*` overrides from the process environment
pub fn apply_env(config: &mut SupervisorConfig) -> BotResult<()> {
    apply_env_from(config, |name| env::var(name).ok())
}

/// Apply `PRBOT_*` overrides using a custom variable lookup
pub fn apply_env_from<F>(config: &mut SupervisorConfig, lookup: F) -> BotResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(paths) = lookup("PRBOT_WATCH_PATHS") {
        config.watch_paths = paths
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    if let Some(d) = millis(&lookup, "PRBOT_DEBOUNCE_MS")? {
        config.debounce_delay = d;
    }
    if let Some(d) = millis(&lookup, "PRBOT_IDLE_CHECK_MS")? {
        config.idle_check_interval = d;
    }
    if let Some(d) = millis(&lookup, "PRBOT_MAX_IDLE_WAIT_MS")? {
        config.max_idle_wait = Some(d);
    }
    if let Some(d) = millis(&lookup, "PRBOT_IDLE_HYSTERESIS_MS")? {
        config.idle_hysteresis = d;
    }
    if let Some(d) = millis(&lookup, "PRBOT_SAMPLE_INTERVAL_MS")? {
        config.sample_interval = d;
    }

    if let Some(path) = lookup("PRBOT_STORE_PATH") {
        config.store_path = Some(PathBuf::from(path));
    }

    if let Some(level) = lookup("PRBOT_LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(())
}

fn millis<F>(lookup: &F, name: &str) -> BotResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| BotError::config(format!("Invalid {} value: {}", name, raw))),
    }
}
