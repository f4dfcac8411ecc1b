//! Owner of in-flight task handles
//!
//! Built once at process start and handed by reference to every handler.
//! It keeps live handles in memory, mirrors them into the
//! [`WorkingTaskRegistry`] so a restarted process can find unfinished work,
//! and records status transitions in the [`TaskStatusStore`].

use super::state::TaskState;
use super::status::TaskStatusStore;
use super::types::{TaskKey, WorkingTask};
use super::working::WorkingTaskRegistry;
use crate::error::{BotError, BotResult};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Live handle for one task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    pub event: WorkingTask,
    pub state: TaskState,
    pub started_at: DateTime<Utc>,
    /// Cancelled when the task is stopped or the orchestrator shuts down
    pub cancel: CancellationToken,
}

impl TaskHandle {
    pub fn key(&self) -> TaskKey {
        self.event.key()
    }
}

/// Resumes one persisted task after a restart
#[async_trait]
pub trait TaskResumer: Send + Sync {
    async fn resume(&self, task: WorkingTask) -> BotResult<()>;
}

/// Outcome of [`TaskOrchestrator::resume_all`]
#[derive(Debug, Default, Clone)]
pub struct ResumeReport {
    pub resumed: Vec<TaskKey>,
    pub failed: Vec<(TaskKey, String)>,
}

impl ResumeReport {
    pub fn total(&self) -> usize {
        self.resumed.len() + self.failed.len()
    }
}

pub struct TaskOrchestrator {
    registry: WorkingTaskRegistry,
    statuses: TaskStatusStore,
    handles: Mutex<HashMap<TaskKey, TaskHandle>>,
    root: CancellationToken,
}

impl TaskOrchestrator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            registry: WorkingTaskRegistry::new(store.clone()),
            statuses: TaskStatusStore::new(store),
            handles: Mutex::new(HashMap::new()),
            root: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &WorkingTaskRegistry {
        &self.registry
    }

    pub fn statuses(&self) -> &TaskStatusStore {
        &self.statuses
    }

    /// Start tracking `event`. Calling it again for a task that is already
    /// live returns the existing handle.
    pub async fn begin(&self, event: WorkingTask) -> BotResult<TaskHandle> {
        let key = event.key();
        if let Some(existing) = self.handles.lock().get(&key) {
            return Ok(existing.clone());
        }

        // A resumed task keeps the progress it had before the restart.
        let workspace_id = key.to_string();
        let state = match self.statuses.get(&workspace_id).await? {
            Some(record) if record.status.is_terminal() => {
                return Err(BotError::invalid_transition(
                    record.status,
                    TaskState::Checking,
                ));
            }
            Some(record) => record.status,
            None => {
                self.statuses
                    .record(&workspace_id, &event, TaskState::Checking)
                    .await?;
                TaskState::Checking
            }
        };
        self.registry.add_working_task(&event).await?;

        let handle = TaskHandle {
            event,
            state,
            started_at: Utc::now(),
            cancel: self.root.child_token(),
        };

        let mut handles = self.handles.lock();
        let handle = handles.entry(key.clone()).or_insert(handle).clone();
        info!(task = %key, active = handles.len(), "task started");
        Ok(handle)
    }

    /// Record a non-terminal progress state such as `thinking`
    pub async fn set_state(&self, key: &TaskKey, state: TaskState) -> BotResult<()> {
        if state.is_terminal() {
            return Err(BotError::invalid_field(
                "state",
                format!("{} ends the task; use finish", state),
            ));
        }

        let event = self.live_event(key)?;
        self.statuses.record(&key.to_string(), &event, state).await?;
        if let Some(handle) = self.handles.lock().get_mut(key) {
            handle.state = state;
        }
        Ok(())
    }

    /// End a task in a terminal state and forget it
    pub async fn finish(&self, key: &TaskKey, state: TaskState) -> BotResult<()> {
        if !state.is_terminal() {
            return Err(BotError::invalid_field(
                "state",
                format!("{} is not a terminal state", state),
            ));
        }

        let event = self.live_event(key)?;
        self.statuses.record(&key.to_string(), &event, state).await?;
        self.registry.remove_working_task(&event).await?;

        let mut handles = self.handles.lock();
        handles.remove(key);
        info!(task = %key, %state, active = handles.len(), "task finished");
        Ok(())
    }

    /// Cancel a live task on its owner's request
    pub async fn stop(&self, key: &TaskKey) -> BotResult<bool> {
        let token = match self.handles.lock().get(key) {
            Some(handle) => handle.cancel.clone(),
            None => return Ok(false),
        };
        token.cancel();
        self.finish(key, TaskState::StoppedByUser).await?;
        Ok(true)
    }

    /// No task is in flight
    pub fn is_idle(&self) -> bool {
        self.handles.lock().is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Snapshot of live handles, oldest first
    pub fn active_tasks(&self) -> Vec<TaskHandle> {
        let mut tasks: Vec<TaskHandle> = self.handles.lock().values().cloned().collect();
        tasks.sort_by_key(|t| t.started_at);
        tasks
    }

    /// Idle predicate suitable for the restart manager
    pub fn idle_predicate(self: &Arc<Self>) -> impl Fn() -> bool + Send + Sync + 'static {
        let orchestrator = Arc::clone(self);
        move || orchestrator.is_idle()
    }

    /// Hand every persisted working task to `resumer`. A failure on one entry
    /// is logged and does not stop the others.
    pub async fn resume_all(&self, resumer: &dyn TaskResumer) -> BotResult<ResumeReport> {
        let tasks = self.registry.get_working_tasks().await?;
        let mut report = ResumeReport::default();

        if tasks.is_empty() {
            return Ok(report);
        }
        info!(count = tasks.len(), "resuming working tasks");

        for task in tasks {
            let key = task.key();
            match resumer.resume(task).await {
                Ok(()) => report.resumed.push(key),
                Err(e) => {
                    warn!(task = %key, error = %e, "failed to resume task");
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        info!(
            resumed = report.resumed.len(),
            failed = report.failed.len(),
            "resume finished"
        );
        Ok(report)
    }

    /// Cancel every live task token
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    fn live_event(&self, key: &TaskKey) -> BotResult<WorkingTask> {
        self.handles
            .lock()
            .get(key)
            .map(|h| h.event.clone())
            .ok_or_else(|| BotError::not_found(format!("no live task {}", key)))
    }
}
