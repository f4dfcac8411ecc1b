//! Filesystem watch registration

use crate::error::{BotError, BotResult};
use notify::event::EventKind;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Kind of a raw filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Modify,
    Remove,
    Other,
}

impl From<&EventKind> for WatchEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => WatchEventKind::Create,
            EventKind::Modify(_) => WatchEventKind::Modify,
            EventKind::Remove(_) => WatchEventKind::Remove,
            _ => WatchEventKind::Other,
        }
    }
}

/// One changed path, handed straight to the debouncer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

/// Open watch handles for one started manager
pub(crate) struct WatchSet {
    watchers: Vec<(PathBuf, RecommendedWatcher)>,
}

impl WatchSet {
    /// Watch every path recursively. Paths that cannot be watched are logged
    /// and skipped.
    pub(crate) fn open(
        paths: &[PathBuf],
        tx: mpsc::UnboundedSender<WatchEvent>,
        name: &str,
    ) -> Self {
        let mut watchers = Vec::new();

        for path in paths {
            match watch_one(path, tx.clone()) {
                Ok(watcher) => {
                    info!(manager = name, path = %path.display(), "watching for changes");
                    watchers.push((path.clone(), watcher));
                }
                Err(e) => {
                    warn!(manager = name, path = %path.display(), error = %e, "cannot watch path, skipping");
                }
            }
        }

        Self { watchers }
    }

    pub(crate) fn watched_paths(&self) -> Vec<PathBuf> {
        self.watchers.iter().map(|(p, _)| p.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

pub(crate) fn watch_one(
    path: &Path,
    tx: mpsc::UnboundedSender<WatchEvent>,
) -> BotResult<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        match result {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }
                let kind = WatchEventKind::from(&event.kind);
                for path in event.paths {
                    // The receiver is gone once the manager stops.
                    let _ = tx.send(WatchEvent { path, kind });
                }
            }
            Err(e) => {
                debug!(error = %e, "watch backend error");
            }
        }
    })?;

    watcher
        .watch(path, RecursiveMode::Recursive)
        .map_err(|e| BotError::watch(e.to_string(), path.display().to_string()))?;
    Ok(watcher)
}
