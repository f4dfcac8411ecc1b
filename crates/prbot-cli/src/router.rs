//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, TasksAction};
use crate::commands;
use crate::console::CliConsole;
use crate::logging;
use anyhow::{Context, Result};
use prbot_core::config::{ConfigLoader, SupervisorConfig};

/// Load configuration, set up logging, then dispatch
pub async fn route(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    logging::init(&config.logging, cli.verbose);
    let console = CliConsole::new(cli.verbose);

    let result = match cli.command {
        Commands::Supervise(args) => commands::supervise::execute(config, args, &console).await,
        Commands::Tasks { action } => route_tasks(action, &config, &console).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, cli.config.as_deref(), &console),
            ConfigAction::Validate => commands::config::validate(&config, &console),
        },
    };

    if let Err(e) = &result {
        console.error(&format!("{:#}", e));
    }
    result
}

async fn route_tasks(action: TasksAction, config: &SupervisorConfig, console: &CliConsole) -> Result<()> {
    match action {
        TasksAction::List { json } => commands::tasks::list(config, json, console).await,
        TasksAction::Remove { channel, ts } => {
            commands::tasks::remove(config, &channel, &ts, console).await
        }
        TasksAction::Reset { channel, ts } => {
            commands::tasks::reset(config, &channel, &ts, console).await
        }
        TasksAction::Clear => commands::tasks::clear(config, console).await,
    }
}

fn load_config(cli: &Cli) -> Result<SupervisorConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader
        .with_env()
        .load()
        .context("failed to load configuration")
}
