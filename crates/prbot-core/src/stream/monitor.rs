//! Child process whose combined output drives the activity indicator and the
//! stream stabilizer

use super::sampler::{SharedTerminal, sample_until_cancelled};
use super::stabilizer::{StabilizedUpdate, StreamStabilizer};
use super::terminal::VirtualTerminal;
use crate::activity::{ActivityIndicator, ActivityObserver};
use crate::config::SupervisorConfig;
use crate::error::{BotError, BotResult};
use parking_lot::Mutex;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 8192;

/// Spawns children and watches their output
pub struct OutputMonitor {
    indicator: ActivityIndicator,
    cols: u16,
    rows: u16,
    sample_interval: Duration,
}

impl OutputMonitor {
    pub fn new(indicator: ActivityIndicator, cols: u16, rows: u16, sample_interval: Duration) -> Self {
        Self {
            indicator,
            cols,
            rows,
            sample_interval,
        }
    }

    /// Terminal size and timings taken from `config`
    pub fn from_config(config: &SupervisorConfig, observer: Arc<dyn ActivityObserver>) -> Self {
        Self::new(
            ActivityIndicator::new(config.idle_hysteresis, observer),
            config.terminal_cols,
            config.terminal_rows,
            config.sample_interval,
        )
    }

    pub fn indicator(&self) -> &ActivityIndicator {
        &self.indicator
    }

    /// Spawn `command` with piped stdout and stderr and start sampling.
    ///
    /// Every child gets a fresh virtual terminal; the activity indicator is
    /// shared across children.
    pub fn spawn(&self, mut command: Command) -> BotResult<MonitoredProcess> {
        let program = format!("{:?}", command.as_std());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| BotError::process(format!("failed to spawn: {}", e), &program))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BotError::process("stdout was not captured", &program))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BotError::process("stderr was not captured", &program))?;

        let terminal: SharedTerminal = Arc::new(Mutex::new(VirtualTerminal::new(self.cols, self.rows)));
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let sampler = tokio::spawn(sample_until_cancelled(
            terminal.clone(),
            self.sample_interval,
            cancel.clone(),
            tx,
        ));

        let readers = {
            let indicator = self.indicator.clone();
            let terminal = terminal.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::join!(
                    pump(stdout, indicator.clone(), terminal.clone()),
                    pump(stderr, indicator, terminal),
                );
                cancel.cancel();
            })
        };

        info!(command = %program, pid = ?child.id(), "spawned child");
        Ok(MonitoredProcess {
            program,
            child,
            terminal,
            readers,
            sampler,
            cancel,
            updates: Some(rx),
        })
    }
}

async fn pump<R>(mut reader: R, indicator: ActivityIndicator, terminal: SharedTerminal)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                indicator.on_chunk();
                terminal.lock().feed(&buf[..n]);
            }
            Err(e) => {
                warn!(error = %e, "output read failed");
                break;
            }
        }
    }
}

/// Exit status plus the final stabilizer state
#[derive(Debug)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stabilizer: StreamStabilizer,
}

/// A running child spawned by [`OutputMonitor::spawn`]
pub struct MonitoredProcess {
    program: String,
    child: Child,
    terminal: SharedTerminal,
    readers: JoinHandle<()>,
    sampler: JoinHandle<StreamStabilizer>,
    cancel: CancellationToken,
    updates: Option<mpsc::UnboundedReceiver<StabilizedUpdate>>,
}

impl MonitoredProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn command(&self) -> &str {
        &self.program
    }

    /// Current full render of the child's output
    pub fn screen(&self) -> String {
        self.terminal.lock().render()
    }

    /// Stabilized output. Can be taken once.
    pub fn take_updates(&mut self) -> Option<mpsc::UnboundedReceiver<StabilizedUpdate>> {
        self.updates.take()
    }

    /// Wait for the child to exit. Cancel safe.
    pub async fn exited(&mut self) -> BotResult<ExitStatus> {
        self.child
            .wait()
            .await
            .map_err(|e| BotError::process(format!("wait failed: {}", e), &self.program))
    }

    /// Wait for exit and for both pipes to close, then stop sampling
    pub async fn finish(mut self) -> BotResult<ProcessOutcome> {
        let status = self.exited().await?;
        if let Err(e) = (&mut self.readers).await {
            if !e.is_cancelled() {
                warn!(command = %self.program, error = %e, "output reader failed");
            }
        }
        self.cancel.cancel();
        let stabilizer = self.sampler.await?;

        debug!(command = %self.program, %status, sent = stabilizer.sent_length(), "child finished");
        Ok(ProcessOutcome { status, stabilizer })
    }

    /// Kill the child and stop reading its output
    pub async fn terminate(mut self) -> BotResult<ProcessOutcome> {
        if let Err(e) = self.child.kill().await {
            warn!(command = %self.program, error = %e, "kill failed");
        }
        self.readers.abort();
        self.finish().await
    }
}
