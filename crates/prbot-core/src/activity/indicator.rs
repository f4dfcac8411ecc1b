//! Busy indicator driven by output chunks

use super::notifier::IdleNotifier;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::debug;

/// Side effects of a busy period
#[async_trait]
pub trait ActivityObserver: Send + Sync {
    /// First chunk of a burst
    async fn busy(&self);
    /// Quiet window elapsed after the burst
    async fn idle(&self);
}

/// Observer that only logs
#[derive(Debug, Clone)]
pub struct LogActivityObserver {
    label: String,
}

impl LogActivityObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl ActivityObserver for LogActivityObserver {
    async fn busy(&self) {
        debug!(stream = %self.label, "busy");
    }

    async fn idle(&self) {
        debug!(stream = %self.label, "idle");
    }
}

/// Emits at most one outstanding busy side effect per stream, followed by
/// exactly one idle side effect after `hysteresis` of silence.
///
/// Must be driven from within a Tokio runtime. Cheap to clone.
#[derive(Clone)]
pub struct ActivityIndicator {
    notifier: IdleNotifier,
    hysteresis: Duration,
    observer: Arc<dyn ActivityObserver>,
    busy: Arc<AtomicBool>,
    busy_periods: Arc<AtomicU64>,
    /// Keeps busy/idle side effects of consecutive periods in order
    effects: Arc<AsyncMutex<()>>,
}

impl ActivityIndicator {
    pub fn new(hysteresis: Duration, observer: Arc<dyn ActivityObserver>) -> Self {
        Self {
            notifier: IdleNotifier::new(),
            hysteresis,
            observer,
            busy: Arc::new(AtomicBool::new(false)),
            busy_periods: Arc::new(AtomicU64::new(0)),
            effects: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Number of busy periods started so far
    pub fn busy_periods(&self) -> u64 {
        self.busy_periods.load(Ordering::SeqCst)
    }

    pub fn hysteresis(&self) -> Duration {
        self.hysteresis
    }

    pub fn notifier(&self) -> &IdleNotifier {
        &self.notifier
    }

    /// Record one chunk of output
    pub fn on_chunk(&self) {
        self.notifier.ping();
        if self.busy.swap(true, Ordering::SeqCst) {
            return;
        }

        self.busy_periods.fetch_add(1, Ordering::SeqCst);
        let mut quiet = self.notifier.wait(self.hysteresis);
        let notifier = self.notifier.clone();
        let hysteresis = self.hysteresis;
        let observer = self.observer.clone();
        let busy = self.busy.clone();
        let effects = self.effects.clone();

        tokio::spawn(async move {
            {
                let _order = effects.lock().await;
                observer.busy().await;
            }
            loop {
                quiet.await;

                // clear under the lock so the next period's busy() queues behind idle()
                let _order = effects.lock().await;
                busy.store(false, Ordering::SeqCst);

                // a chunk that saw busy still set after the window closed
                // never started a period of its own
                let recent = notifier
                    .last_ping_at()
                    .is_some_and(|at| at + hysteresis > Instant::now());
                if recent
                    && busy
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    quiet = notifier.wait(hysteresis);
                    continue;
                }

                observer.idle().await;
                return;
            }
        });
    }
}
