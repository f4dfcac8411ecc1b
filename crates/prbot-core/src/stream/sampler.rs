//! Fixed-rate sampling of a terminal render

use super::stabilizer::{StabilizedUpdate, StreamStabilizer};
use super::terminal::TerminalEmulator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Terminal shared between the output readers and the sampler
pub type SharedTerminal = Arc<Mutex<dyn TerminalEmulator>>;

/// Shortest sampling period; shorter periods, zero included, are raised to it
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// Sample `terminal` every `period` until `cancel` fires or the receiver of
/// `updates` goes away. Returns the stabilizer so callers can inspect what
/// was sent.
///
/// Nothing is emitted after cancellation, including a final sample.
pub async fn sample_until_cancelled(
    terminal: SharedTerminal,
    period: Duration,
    cancel: CancellationToken,
    updates: mpsc::UnboundedSender<StabilizedUpdate>,
) -> StreamStabilizer {
    let mut stabilizer = StreamStabilizer::new();
    let period = period.max(MIN_SAMPLE_INTERVAL);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let (render, evicted) = {
                    let terminal = terminal.lock();
                    (terminal.render(), terminal.evicted_lines())
                };
                if let Some(update) = stabilizer.observe(&render, evicted) {
                    if updates.send(update).is_err() {
                        break;
                    }
                }
            }
        }
    }

    stabilizer
}
