//! Debounced change watcher and idle gate
//!
//! Relevant source changes (re)arm a single debounce timer. When it fires a
//! restart is queued; the restart callback runs as soon as the idle predicate
//! reports true, either immediately or on a later poll tick.
//!
//! All methods must be called from within a Tokio runtime.

use super::ignore::IgnoreMatcher;
use super::phase::RestartPhase;
use super::watcher::{WatchEvent, WatchSet};
use crate::config::{IdleTimeoutAction, SupervisorConfig};
use parking_lot::Mutex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, warn};

/// Reports whether the bot currently has no in-flight work
pub type IdlePredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Invoked once a queued restart may proceed
pub type RestartCallback = Arc<dyn Fn() + Send + Sync>;

/// Shortest idle poll period; shorter intervals, zero included, are raised to it
pub const MIN_IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(1);

/// Timing and logging options for a [`RestartManager`]
#[derive(Debug, Clone)]
pub struct RestartOptions {
    /// Label attached to every log line
    pub name: String,
    pub debounce_delay: Duration,
    pub idle_check_interval: Duration,
    /// `None` polls the idle predicate until it is true or the manager stops
    pub max_idle_wait: Option<Duration>,
    pub idle_timeout_action: IdleTimeoutAction,
}

impl Default for RestartOptions {
    fn default() -> Self {
        Self {
            name: "restart-manager".to_string(),
            debounce_delay: Duration::from_millis(1000),
            idle_check_interval: Duration::from_millis(5000),
            max_idle_wait: None,
            idle_timeout_action: IdleTimeoutAction::ForceRestart,
        }
    }
}

impl RestartOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn with_idle_check_interval(mut self, interval: Duration) -> Self {
        self.idle_check_interval = interval;
        self
    }

    pub fn with_max_idle_wait(mut self, max: Duration, action: IdleTimeoutAction) -> Self {
        self.max_idle_wait = Some(max);
        self.idle_timeout_action = action;
        self
    }
}

impl From<&SupervisorConfig> for RestartOptions {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            name: config.name.clone(),
            debounce_delay: config.debounce_delay,
            idle_check_interval: config.idle_check_interval,
            max_idle_wait: config.max_idle_wait,
            idle_timeout_action: config.idle_timeout_action,
        }
    }
}

struct State {
    phase: RestartPhase,
    restart_pending: bool,
    /// Bumped by every stop; timers from an older generation never act
    generation: u64,
    /// Bumped by every accepted change; only the latest debounce timer fires
    debounce_seq: u64,
    ignore: IgnoreMatcher,
    /// Watched roots as given and canonicalized; ignore rules apply below them
    roots: Vec<PathBuf>,
    watches: Option<WatchSet>,
    pump: Option<JoinHandle<()>>,
    debounce: Option<JoinHandle<()>>,
    poll: Option<JoinHandle<()>>,
}

struct Inner {
    options: RestartOptions,
    is_idle: IdlePredicate,
    on_restart: RestartCallback,
    state: Mutex<State>,
}

/// Restarts the bot after source changes, but only while it is idle.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RestartManager {
    inner: Arc<Inner>,
}

impl RestartManager {
    pub fn new<P, R>(options: RestartOptions, is_idle: P, on_restart: R) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        R: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                options,
                is_idle: Arc::new(is_idle),
                on_restart: Arc::new(on_restart),
                state: Mutex::new(State {
                    phase: RestartPhase::Idle,
                    restart_pending: false,
                    generation: 0,
                    debounce_seq: 0,
                    ignore: IgnoreMatcher::builtin(),
                    roots: Vec::new(),
                    watches: None,
                    pump: None,
                    debounce: None,
                    poll: None,
                }),
            }),
        }
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn name(&self) -> &str {
        &self.inner.options.name
    }

    pub fn options(&self) -> &RestartOptions {
        &self.inner.options
    }

    pub fn phase(&self) -> RestartPhase {
        self.inner.state.lock().phase
    }

    pub fn is_restart_pending(&self) -> bool {
        self.inner.state.lock().restart_pending
    }

    /// Paths with an open watch handle
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.inner
            .state
            .lock()
            .watches
            .as_ref()
            .map(WatchSet::watched_paths)
            .unwrap_or_default()
    }

    /// Begin watching `paths` recursively. `ignore_patterns` extend the
    /// built-in ignore set. Unwatchable paths and invalid patterns are logged
    /// and skipped; nothing is returned to the caller.
    pub fn start(&self, paths: &[PathBuf], ignore_patterns: &[String]) {
        let mut state = self.inner.state.lock();
        if state.watches.is_some() {
            warn!(manager = self.name(), "already watching, ignoring start");
            return;
        }

        state.ignore = build_ignore(self.name(), ignore_patterns);
        state.roots = paths
            .iter()
            .flat_map(|p| [p.clone(), p.canonicalize().unwrap_or_else(|_| p.clone())])
            .collect();

        let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
        let watches = WatchSet::open(paths, tx, self.name());
        if watches.is_empty() {
            warn!(manager = self.name(), "no watch path could be opened");
        }

        let weak = Arc::downgrade(&self.inner);
        state.pump = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(manager) = Self::from_weak(&weak) else {
                    break;
                };
                debug!(manager = manager.name(), path = %event.path.display(), kind = ?event.kind, "change");
                manager.on_change(&event.path);
            }
        }));

        state.watches = Some(watches);
        state.phase = RestartPhase::Idle;
    }

    /// Entry point for one filesystem change. Ignored paths are dropped;
    /// anything else restarts the debounce timer. Changes are dropped after
    /// a stop or restart until the next `start`.
    pub fn on_change(&self, path: &Path) {
        let mut state = self.inner.state.lock();
        if state.phase.is_terminal() {
            debug!(manager = self.name(), phase = %state.phase, "not watching, change dropped");
            return;
        }

        let relative = state
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        if state.ignore.is_ignored(relative) {
            return;
        }

        if state.restart_pending {
            debug!(manager = self.name(), path = %path.display(), "restart already queued");
            return;
        }

        if let Some(previous) = state.debounce.take() {
            previous.abort();
        }

        state.debounce_seq += 1;
        let seq = state.debounce_seq;
        let generation = state.generation;
        let delay = self.inner.options.debounce_delay;
        let weak = Arc::downgrade(&self.inner);

        state.debounce = Some(tokio::spawn(async move {
            sleep(delay).await;
            if let Some(manager) = Self::from_weak(&weak) {
                manager.debounce_elapsed(generation, seq);
            }
        }));
        state.phase = RestartPhase::Debouncing;
    }

    fn debounce_elapsed(&self, generation: u64, seq: u64) {
        {
            let mut state = self.inner.state.lock();
            if state.generation != generation || state.debounce_seq != seq {
                return;
            }
            state.debounce = None;
        }
        info!(manager = self.name(), "source changed");
        self.queue_restart();
    }

    /// Request a restart. A second request while one is pending is a no-op.
    pub fn queue_restart(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.restart_pending {
                info!(manager = self.name(), "restart already queued");
                return;
            }
            state.restart_pending = true;
            state.phase = RestartPhase::RestartQueued;
        }

        if self.check_idle() {
            self.execute_restart();
            return;
        }

        let mut state = self.inner.state.lock();
        if !state.restart_pending {
            // stopped while the predicate ran
            return;
        }

        info!(
            manager = self.name(),
            interval_ms = self.inner.options.idle_check_interval.as_millis() as u64,
            "busy, waiting for idle before restarting"
        );
        state.phase = RestartPhase::PollingForIdle;
        let generation = state.generation;
        let weak = Arc::downgrade(&self.inner);
        let options = self.inner.options.clone();
        state.poll = Some(tokio::spawn(poll_for_idle(weak, generation, options)));
    }

    /// Cancel the poll, stop everything, then invoke the restart callback
    pub fn execute_restart(&self) {
        {
            let mut state = self.inner.state.lock();
            if !state.restart_pending {
                debug!(manager = self.name(), "no restart pending");
                return;
            }
            if let Some(poll) = state.poll.take() {
                poll.abort();
            }
            self.stop_locked(&mut state);
            state.phase = RestartPhase::Restarted;
        }

        info!(manager = self.name(), "restarting");
        (self.inner.on_restart)();
    }

    /// Close every watcher, cancel pending timers and clear the pending
    /// restart. Safe to call repeatedly or before `start`.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        self.stop_locked(&mut state);
        state.phase = RestartPhase::Stopped;
    }

    fn stop_locked(&self, state: &mut State) {
        state.generation += 1;
        state.restart_pending = false;

        for handle in [state.debounce.take(), state.poll.take(), state.pump.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }

        if let Some(watches) = state.watches.take() {
            info!(manager = self.name(), watchers = watches.len(), "closing watchers");
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.inner.state.lock();
        state.generation == generation && state.restart_pending
    }

    /// Run the idle predicate. A panicking predicate counts as busy.
    fn check_idle(&self) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.inner.is_idle)())) {
            Ok(idle) => idle,
            Err(_) => {
                warn!(manager = self.name(), "idle predicate panicked, treating as busy");
                false
            }
        }
    }
}

async fn poll_for_idle(weak: Weak<Inner>, generation: u64, options: RestartOptions) {
    let started = Instant::now();
    let period = options.idle_check_interval.max(MIN_IDLE_CHECK_INTERVAL);
    let mut ticker = interval_at(started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut warned = false;

    loop {
        ticker.tick().await;

        let Some(manager) = RestartManager::from_weak(&weak) else {
            return;
        };
        if !manager.is_current(generation) {
            return;
        }

        if manager.check_idle() {
            manager.execute_restart();
            return;
        }

        let Some(max_wait) = options.max_idle_wait else {
            debug!(manager = manager.name(), "still busy");
            continue;
        };
        if started.elapsed() < max_wait {
            continue;
        }

        match options.idle_timeout_action {
            IdleTimeoutAction::ForceRestart => {
                warn!(
                    manager = manager.name(),
                    waited_ms = started.elapsed().as_millis() as u64,
                    "still busy after max idle wait, forcing restart"
                );
                manager.execute_restart();
                return;
            }
            IdleTimeoutAction::KeepWaiting => {
                if !warned {
                    warn!(
                        manager = manager.name(),
                        waited_ms = started.elapsed().as_millis() as u64,
                        "still busy after max idle wait, continuing to wait"
                    );
                    warned = true;
                }
            }
        }
    }
}

fn build_ignore(name: &str, patterns: &[String]) -> IgnoreMatcher {
    let mut valid = Vec::new();
    for pattern in patterns {
        match regex::Regex::new(pattern) {
            Ok(_) => valid.push(pattern.clone()),
            Err(e) => warn!(manager = name, pattern = %pattern, error = %e, "invalid ignore pattern, skipping"),
        }
    }
    IgnoreMatcher::with_extra(valid).unwrap_or_default()
}
