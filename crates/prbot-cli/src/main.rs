//! prbot command-line interface
//!
//! ```bash
//! prbot supervise --watch src -- node dist/bot.js
//! prbot tasks list
//! prbot config show
//! ```

mod args;
mod commands;
mod console;
mod logging;
mod router;


use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
