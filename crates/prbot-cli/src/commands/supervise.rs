//! Run a bot under the restart manager

use crate::args::SuperviseArgs;
use crate::console::CliConsole;
use anyhow::{Context, Result, bail};
use prbot_core::activity::{ActivityObserver, LogActivityObserver};
use prbot_core::config::{IdleTimeoutAction, SupervisorConfig};
use prbot_core::messaging::{
    ChatClient, LogChatClient, PostTarget, ReactionActivityObserver, StatusMessagePublisher,
};
use prbot_core::stream::{MonitoredProcess, OutputMonitor, StabilizedUpdate};
use prbot_core::supervisor::{RestartManager, RestartOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

enum Next {
    Restart,
    Exited,
    Interrupted,
}

/// Fold command-line overrides into the loaded configuration
pub fn apply_overrides(config: &mut SupervisorConfig, args: &SuperviseArgs) {
    if !args.watch.is_empty() {
        config.watch_paths = args.watch.clone();
    }
    config.ignore_patterns.extend(args.ignore.iter().cloned());
    if let Some(ms) = args.debounce_ms {
        config.debounce_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.idle_check_ms {
        config.idle_check_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = args.max_idle_wait_ms {
        config.max_idle_wait = Some(Duration::from_millis(ms));
    }
}

pub async fn execute(mut config: SupervisorConfig, args: SuperviseArgs, console: &CliConsole) -> Result<()> {
    apply_overrides(&mut config, &args);
    config.validate().context("invalid supervisor configuration")?;

    let Some((program, program_args)) = args.command.split_first() else {
        bail!("no command to supervise");
    };

    let chat: Arc<dyn ChatClient> = Arc::new(LogChatClient::new());
    let (observer, status_target): (Arc<dyn ActivityObserver>, Option<PostTarget>) =
        match &args.status_channel {
            Some(channel) => {
                let header = chat
                    .post_message(
                        &PostTarget::channel(channel.clone()),
                        &format!("supervising `{}`", args.command.join(" ")),
                    )
                    .await?;
                (
                    Arc::new(ReactionActivityObserver::new(chat.clone(), header.clone())),
                    Some(PostTarget::thread(&header)),
                )
            }
            None => (Arc::new(LogActivityObserver::new(program.clone())), None),
        };

    let monitor = OutputMonitor::from_config(&config, observer);
    let (restart_tx, mut restart_rx) = mpsc::unbounded_channel::<()>();
    let indicator = monitor.indicator().clone();
    let manager = RestartManager::new(
        RestartOptions::from(&config),
        move || !indicator.is_busy(),
        move || {
            let _ = restart_tx.send(());
        },
    );

    console.print_header("Supervising");
    console.info(&format!("Command: {}", args.command.join(" ")));
    for path in &config.watch_paths {
        console.info(&format!("Watching {}", path.display()));
    }
    if let (Some(max), IdleTimeoutAction::ForceRestart) = (config.max_idle_wait, config.idle_timeout_action) {
        console.info(&format!("Forcing restart after {:?} of waiting for idle", max));
    }

    let mut restarts = 0u32;
    loop {
        let mut command = Command::new(program);
        command.args(program_args);
        let mut process = monitor
            .spawn(command)
            .with_context(|| format!("failed to start {}", program))?;
        let output = forward_output(&mut process, chat.clone(), status_target.clone());

        manager.start(&config.watch_paths, &config.ignore_patterns);

        let next = tokio::select! {
            _ = restart_rx.recv() => Next::Restart,
            _ = process.exited() => Next::Exited,
            _ = tokio::signal::ctrl_c() => Next::Interrupted,
        };

        match next {
            Next::Restart => {
                restarts += 1;
                info!(restarts, "restarting supervised command");
                console.warn("Sources changed, restarting");
                process.terminate().await?;
                finish_output(output).await;
            }
            Next::Exited => {
                manager.stop();
                let outcome = process.finish().await?;
                finish_output(output).await;
                if outcome.status.success() {
                    console.success("Command exited");
                    return Ok(());
                }
                bail!("command exited with {}", outcome.status);
            }
            Next::Interrupted => {
                manager.stop();
                console.warn("Interrupted, stopping");
                process.terminate().await?;
                finish_output(output).await;
                return Ok(());
            }
        }
    }
}

/// Publish stabilized output to chat when a status channel is set, otherwise
/// print it
fn forward_output(
    process: &mut MonitoredProcess,
    chat: Arc<dyn ChatClient>,
    target: Option<PostTarget>,
) -> Option<JoinHandle<()>> {
    let mut updates = process.take_updates()?;
    match target {
        Some(target) => {
            let publisher = StatusMessagePublisher::new(chat, target);
            Some(tokio::spawn(async move {
                publisher.run(updates).await;
            }))
        }
        None => Some(tokio::spawn(async move {
            let console = CliConsole::new(true);
            while let Some(update) = updates.recv().await {
                print_update(&console, &update);
            }
        })),
    }
}

fn print_update(console: &CliConsole, update: &StabilizedUpdate) {
    console.print_output(update.delta.trim_start_matches('\n'));
}

async fn finish_output(output: Option<JoinHandle<()>>) {
    if let Some(handle) = output {
        let _ = handle.await;
    }
}
