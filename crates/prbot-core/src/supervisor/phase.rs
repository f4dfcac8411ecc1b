//! Restart manager state machine

use std::fmt;

/// Where the restart manager currently is.
///
/// `Idle → Debouncing → RestartQueued → (PollingForIdle)? → Restarted`,
/// with `Stopped` reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPhase {
    /// Watching, nothing pending
    Idle,
    /// A relevant change arrived; waiting for the burst to end
    Debouncing,
    /// Restart requested; checking the idle predicate
    RestartQueued,
    /// Restart requested while busy; polling the idle predicate
    PollingForIdle,
    /// The restart callback fired
    Restarted,
    /// Stopped by the caller
    Stopped,
}

impl RestartPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RestartPhase::Restarted | RestartPhase::Stopped)
    }
}

impl fmt::Display for RestartPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestartPhase::Idle => "idle",
            RestartPhase::Debouncing => "debouncing",
            RestartPhase::RestartQueued => "restart-queued",
            RestartPhase::PollingForIdle => "polling-for-idle",
            RestartPhase::Restarted => "restarted",
            RestartPhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
