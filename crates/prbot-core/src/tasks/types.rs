//! Working task identity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity of a working task: the conversation channel plus the timestamp
/// of the message that started it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub channel: String,
    pub ts: String,
}

impl TaskKey {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ts: ts.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.ts)
    }
}

/// One unit of conversational work, stored with whatever event payload the
/// chat platform delivered alongside `channel` and `ts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingTask {
    pub channel: String,
    pub ts: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl WorkingTask {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ts: ts.into(),
            payload: Map::new(),
        }
    }

    /// Attach an extra payload field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.channel.clone(), self.ts.clone())
    }

    /// Whether `other` refers to the same (channel, ts) pair
    pub fn same_identity(&self, other: &WorkingTask) -> bool {
        self.channel == other.channel && self.ts == other.ts
    }
}
