use crate::tasks::{TaskKey, WorkingTask};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A posted message, addressed by channel and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

impl MessageRef {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ts: ts.into(),
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.ts)
    }
}

impl From<&TaskKey> for MessageRef {
    fn from(key: &TaskKey) -> Self {
        Self::new(key.channel.clone(), key.ts.clone())
    }
}

impl From<&WorkingTask> for MessageRef {
    fn from(task: &WorkingTask) -> Self {
        Self::new(task.channel.clone(), task.ts.clone())
    }
}

/// Where a new message goes: a channel, optionally inside a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTarget {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl PostTarget {
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: None,
        }
    }

    /// Reply in the thread started by `parent`
    pub fn thread(parent: &MessageRef) -> Self {
        Self {
            channel: parent.channel.clone(),
            thread_ts: Some(parent.ts.clone()),
        }
    }
}
