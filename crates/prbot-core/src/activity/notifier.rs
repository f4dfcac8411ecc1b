//! Quiet-window notifier

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Records activity and resolves waiters after a period of silence.
///
/// Every outstanding [`wait`](Self::wait) restarts its countdown on each
/// [`ping`](Self::ping). Clones share the same activity clock.
#[derive(Debug, Clone)]
pub struct IdleNotifier {
    last_ping: Arc<watch::Sender<Option<Instant>>>,
}

impl Default for IdleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            last_ping: Arc::new(tx),
        }
    }

    /// Mark "now" as the latest activity. Never blocks.
    pub fn ping(&self) {
        self.last_ping.send_replace(Some(Instant::now()));
    }

    pub fn last_ping_at(&self) -> Option<Instant> {
        *self.last_ping.borrow()
    }

    /// Resolve once `quiet` has elapsed with no `ping`, counting from this
    /// call or from the most recent ping made while waiting.
    ///
    /// The countdown is armed here, not on first poll. A wait first polled
    /// after its deadline resolves even if pings arrived in the meantime.
    pub fn wait(&self, quiet: Duration) -> BoxFuture<'static, ()> {
        let mut pings = self.last_ping.subscribe();
        let mut deadline = Instant::now() + quiet;

        Box::pin(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = sleep_until(deadline) => return,
                    changed = pings.changed() => {
                        if changed.is_err() {
                            // every notifier is gone, nothing can ping again
                            sleep_until(deadline).await;
                            return;
                        }
                        let pinged_at = pings.borrow_and_update().unwrap_or_else(Instant::now);
                        deadline = pinged_at + quiet;
                    }
                }
            }
        })
    }
}
