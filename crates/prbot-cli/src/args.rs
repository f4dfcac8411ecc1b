//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prbot")]
#[command(about = "prbot supervisor - hot restarts without dropping in-flight work")]
#[command(
    long_about = r#"prbot supervisor - hot restarts without dropping in-flight work

USAGE:
  prbot supervise -- <command> [args...]   # Run and hot-restart a bot
  prbot tasks list                          # Show persisted working tasks
  prbot tasks remove <channel> <ts>         # Forget one working task
  prbot config show                         # Print the effective config"#
)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "PRBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a bot command and restart it when its sources change
    Supervise(SuperviseArgs),

    /// Inspect or edit the persisted working tasks
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Clone, Debug)]
pub struct SuperviseArgs {
    /// Directory to watch recursively (repeatable, replaces configured paths)
    #[arg(long = "watch", value_name = "DIR")]
    pub watch: Vec<PathBuf>,

    /// Extra ignore regex (repeatable, added to configured patterns)
    #[arg(long = "ignore", value_name = "REGEX")]
    pub ignore: Vec<String>,

    /// Quiet period after the last change before a restart is queued
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// How often to re-check for idle while a restart waits
    #[arg(long, value_name = "MS")]
    pub idle_check_ms: Option<u64>,

    /// Give up waiting for idle after this long
    #[arg(long, value_name = "MS")]
    pub max_idle_wait_ms: Option<u64>,

    /// Post live status for the child to this chat channel
    #[arg(long, value_name = "CHANNEL")]
    pub status_channel: Option<String>,

    /// Command to supervise
    #[arg(last = true, required = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum TasksAction {
    /// List working tasks with their recorded status
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove one working task
    Remove { channel: String, ts: String },
    /// Move a done or failed task back to checking
    Reset { channel: String, ts: String },
    /// Remove every working task
    Clear,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the configuration
    Validate,
}
