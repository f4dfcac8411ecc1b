//! Bot process supervisor
//!
//! Watches the bot's own source tree and restarts the process only when it is
//! safe to do so:
//! - filesystem events pass through an [`IgnoreMatcher`]
//! - bursts are coalesced by a trailing-edge debounce
//! - the queued restart waits on a caller-supplied idle predicate
//! - the restart callback fires exactly once per queued restart

mod ignore;
mod phase;
mod restart_manager;
mod watcher;


pub use ignore::{BUILTIN_IGNORE_PATTERNS, IgnoreMatcher};
pub use phase::RestartPhase;
pub use restart_manager::{
    IdlePredicate, MIN_IDLE_CHECK_INTERVAL, RestartCallback, RestartManager, RestartOptions,
};
pub use watcher::{WatchEvent, WatchEventKind};
