//! Task lifecycle state

use crate::error::BotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status attached to a working task.
///
/// Transitions only move forward (`checking` → `thinking` → a terminal
/// state). `done` and `failed` can be revisited through an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Checking,
    Thinking,
    Done,
    StoppedByUser,
    ForwardToOtherChannel,
    Failed,
}

impl TaskState {
    pub const ALL: [TaskState; 6] = [
        TaskState::Checking,
        TaskState::Thinking,
        TaskState::Done,
        TaskState::StoppedByUser,
        TaskState::ForwardToOtherChannel,
        TaskState::Failed,
    ];

    fn rank(self) -> u8 {
        match self {
            TaskState::Checking => 0,
            TaskState::Thinking => 1,
            TaskState::Done
            | TaskState::StoppedByUser
            | TaskState::ForwardToOtherChannel
            | TaskState::Failed => 2,
        }
    }

    /// No further work happens in this state
    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Whether an explicit reset may bring the task back to `checking`
    pub fn is_resettable(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }

    /// Forward-only transition rule. Re-entering the current non-terminal
    /// state is allowed.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }

    /// Chat reaction shown on the triggering message
    pub fn reaction(self) -> &'static str {
        match self {
            TaskState::Checking => "eyes",
            TaskState::Thinking => "hourglass_flowing_sand",
            TaskState::Done => "white_check_mark",
            TaskState::StoppedByUser => "octagonal_sign",
            TaskState::ForwardToOtherChannel => "arrow_right",
            TaskState::Failed => "x",
        }
    }

    /// Glyph used in status messages
    pub fn emoji(self) -> &'static str {
        match self {
            TaskState::Checking => "👀",
            TaskState::Thinking => "🤔",
            TaskState::Done => "✅",
            TaskState::StoppedByUser => "🛑",
            TaskState::ForwardToOtherChannel => "➡️",
            TaskState::Failed => "❌",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Checking => "checking",
            TaskState::Thinking => "thinking",
            TaskState::Done => "done",
            TaskState::StoppedByUser => "stopped_by_user",
            TaskState::ForwardToOtherChannel => "forward_to_other_channel",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| BotError::invalid_field("status", format!("unknown task state '{}'", s)))
    }
}
