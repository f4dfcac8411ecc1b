//! Configuration commands

use crate::console::CliConsole;
use anyhow::Result;
use prbot_core::config::SupervisorConfig;
use std::path::Path;

/// Print the effective configuration as TOML
pub fn show(config: &SupervisorConfig, source: Option<&Path>, console: &CliConsole) -> Result<()> {
    console.print_header("Configuration");
    match source {
        Some(path) => console.info(&format!("Loaded from {}", path.display())),
        None => console.info("No configuration file, using defaults and environment"),
    }
    console.info(&format!("State file: {}", config.resolved_store_path().display()));

    println!("{}", config.to_toml()?);
    Ok(())
}

pub fn validate(config: &SupervisorConfig, console: &CliConsole) -> Result<()> {
    config.validate()?;
    console.success("Configuration is valid");
    for path in &config.watch_paths {
        if !path.exists() {
            console.warn(&format!("Watch path does not exist: {}", path.display()));
        }
    }
    Ok(())
}
