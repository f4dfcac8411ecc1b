//! Per-task status records

use super::state::TaskState;
use super::types::WorkingTask;
use crate::error::{BotError, BotResult};
use crate::storage::{KeyValueStore, get_json, update_json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Stored under `task-{workspaceId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusRecord {
    pub status: TaskState,
    pub event: WorkingTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads and writes task status records, enforcing forward-only transitions
#[derive(Clone)]
pub struct TaskStatusStore {
    store: Arc<dyn KeyValueStore>,
}

impl TaskStatusStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key(workspace_id: &str) -> String {
        format!("task-{}", workspace_id)
    }

    pub async fn get(&self, workspace_id: &str) -> BotResult<Option<TaskStatusRecord>> {
        get_json(self.store.as_ref(), &Self::key(workspace_id)).await
    }

    /// Move the task to `status`, creating the record if needed. Fails with
    /// `InvalidTransition` when the move would go backwards or leave a
    /// terminal state.
    pub async fn record(
        &self,
        workspace_id: &str,
        event: &WorkingTask,
        status: TaskState,
    ) -> BotResult<TaskStatusRecord> {
        let event = event.clone();
        let updated = update_json::<Option<TaskStatusRecord>, _>(
            self.store.as_ref(),
            &Self::key(workspace_id),
            move |slot| {
                if let Some(existing) = slot.as_mut() {
                    if existing.status != status && !existing.status.can_transition_to(status) {
                        return Err(BotError::invalid_transition(existing.status, status));
                    }
                    existing.status = status;
                    existing.updated_at = Some(Utc::now());
                    return Ok(());
                }

                *slot = Some(TaskStatusRecord {
                    status,
                    event,
                    updated_at: Some(Utc::now()),
                    extra: Map::new(),
                });
                Ok(())
            },
        )
        .await?;

        updated.ok_or_else(|| BotError::storage("task status record vanished during update"))
    }

    /// Explicitly bring a `done` or `failed` task back to `checking`
    pub async fn reset(&self, workspace_id: &str) -> BotResult<TaskStatusRecord> {
        let id = workspace_id.to_string();
        let updated = update_json::<Option<TaskStatusRecord>, _>(
            self.store.as_ref(),
            &Self::key(workspace_id),
            move |slot| {
                let existing = slot
                    .as_mut()
                    .ok_or_else(|| BotError::not_found(format!("task {}", id)))?;
                if !existing.status.is_resettable() {
                    return Err(BotError::invalid_transition(
                        existing.status,
                        TaskState::Checking,
                    ));
                }
                existing.status = TaskState::Checking;
                existing.updated_at = Some(Utc::now());
                Ok(())
            },
        )
        .await?;

        updated.ok_or_else(|| BotError::storage("task status record vanished during reset"))
    }

    pub async fn remove(&self, workspace_id: &str) -> BotResult<bool> {
        self.store.delete(&Self::key(workspace_id)).await
    }
}
