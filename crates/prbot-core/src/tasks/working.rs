//! Persisted registry of in-flight work

use super::types::WorkingTask;
use crate::error::BotResult;
use crate::storage::{KeyValueStore, get_json, update_json_with};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Key under which the working-task list is stored
pub const WORKING_TASKS_KEY: &str = "current-working-tasks";

/// Stored shape of the working-task list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingTasksRecord {
    #[serde(rename = "workingMessageEvents", default)]
    pub working_message_events: Vec<WorkingTask>,
}

/// The set of tasks currently being handled, keyed by (channel, ts).
///
/// Each mutation is a read-modify-write of the whole list. Calls on one
/// registry are serialized and go through [`KeyValueStore::update`], so a
/// single process never loses an update; two processes sharing the same store
/// still can.
pub struct WorkingTaskRegistry {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl WorkingTaskRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Append `event` unless an entry with the same (channel, ts) exists.
    /// Returns whether the list changed.
    pub async fn add_working_task(&self, event: &WorkingTask) -> BotResult<bool> {
        let _guard = self.write_lock.lock().await;
        let event = event.clone();
        let key = event.key();

        let added = self
            .mutate(move |tasks| {
                if tasks.iter().any(|t| t.same_identity(&event)) {
                    return false;
                }
                tasks.push(event);
                true
            })
            .await?;

        debug!(task = %key, added, "add working task");
        Ok(added)
    }

    /// Drop every entry matching the (channel, ts) of `event`. Returns how
    /// many entries were removed.
    pub async fn remove_working_task(&self, event: &WorkingTask) -> BotResult<usize> {
        let _guard = self.write_lock.lock().await;
        let event = event.clone();
        let key = event.key();

        let removed = self
            .mutate(move |tasks| {
                let before = tasks.len();
                tasks.retain(|t| !t.same_identity(&event));
                before - tasks.len()
            })
            .await?;

        debug!(task = %key, removed, "remove working task");
        Ok(removed)
    }

    /// Current list, empty when nothing was persisted yet
    pub async fn get_working_tasks(&self) -> BotResult<Vec<WorkingTask>> {
        let record: Option<WorkingTasksRecord> =
            get_json(self.store.as_ref(), WORKING_TASKS_KEY).await?;
        Ok(record.unwrap_or_default().working_message_events)
    }

    /// Forget every working task. Returns how many were dropped.
    pub async fn clear(&self) -> BotResult<usize> {
        let _guard = self.write_lock.lock().await;
        let removed = self
            .mutate(|tasks| {
                let removed = tasks.len();
                tasks.clear();
                removed
            })
            .await?;
        Ok(removed)
    }

    /// Apply `f` to the stored list and return what it computed
    async fn mutate<R, F>(&self, f: F) -> BotResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Vec<WorkingTask>) -> R + Send + 'static,
    {
        let (_, output) = update_json_with(
            self.store.as_ref(),
            WORKING_TASKS_KEY,
            move |record: &mut WorkingTasksRecord| Ok(f(&mut record.working_message_events)),
        )
        .await?;
        Ok(output)
    }
}
