//! Working task commands

use crate::console::CliConsole;
use anyhow::Result;
use colored::*;
use prbot_core::config::SupervisorConfig;
use prbot_core::storage::{JsonFileStore, KeyValueStore};
use prbot_core::tasks::{TaskKey, TaskStatusStore, WorkingTask, WorkingTaskRegistry};
use std::sync::Arc;

fn open_store(config: &SupervisorConfig) -> Arc<dyn KeyValueStore> {
    Arc::new(JsonFileStore::new(config.resolved_store_path()))
}

pub async fn list(config: &SupervisorConfig, json: bool, console: &CliConsole) -> Result<()> {
    let store = open_store(config);
    let registry = WorkingTaskRegistry::new(store.clone());
    let statuses = TaskStatusStore::new(store);
    let tasks = registry.get_working_tasks().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    console.print_header("Working tasks");
    if tasks.is_empty() {
        println!("{}", "none".dimmed());
        return Ok(());
    }

    for task in &tasks {
        let key = task.key();
        let status = match statuses.get(&key.to_string()).await? {
            Some(record) => format!("{} {}", record.status.emoji(), record.status),
            None => "unknown".dimmed().to_string(),
        };
        println!("  {} {} {}", key.channel.cyan(), key.ts, status);
    }
    console.info(&format!("{} task(s)", tasks.len()));
    Ok(())
}

pub async fn remove(config: &SupervisorConfig, channel: &str, ts: &str, console: &CliConsole) -> Result<()> {
    let registry = WorkingTaskRegistry::new(open_store(config));
    let removed = registry
        .remove_working_task(&WorkingTask::new(channel, ts))
        .await?;

    if removed == 0 {
        console.warn(&format!("No working task {}", TaskKey::new(channel, ts)));
    } else {
        console.success(&format!("Removed {}", TaskKey::new(channel, ts)));
    }
    Ok(())
}

pub async fn reset(config: &SupervisorConfig, channel: &str, ts: &str, console: &CliConsole) -> Result<()> {
    let statuses = TaskStatusStore::new(open_store(config));
    let key = TaskKey::new(channel, ts);
    let record = statuses.reset(&key.to_string()).await?;
    console.success(&format!("{} is now {}", key, record.status));
    Ok(())
}

pub async fn clear(config: &SupervisorConfig, console: &CliConsole) -> Result<()> {
    let registry = WorkingTaskRegistry::new(open_store(config));
    let cleared = registry.clear().await?;
    console.success(&format!("Cleared {} working task(s)", cleared));
    Ok(())
}
