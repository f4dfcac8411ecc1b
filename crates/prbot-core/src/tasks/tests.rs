//! Tests for task tracking

#[cfg(test)]
mod tests {
    use crate::error::{BotError, BotResult};
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::tasks::{
        TaskKey, TaskOrchestrator, TaskResumer, TaskState, TaskStatusStore, WORKING_TASKS_KEY,
        WorkingTask, WorkingTaskRegistry,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    fn event(channel: &str, ts: &str) -> WorkingTask {
        WorkingTask::new(channel, ts).with_field("text", "please tag the release")
    }

    // ========== TaskState ==========

    #[test]
    fn test_task_state_forward_only() {
        assert!(TaskState::Checking.can_transition_to(TaskState::Thinking));
        assert!(TaskState::Thinking.can_transition_to(TaskState::Done));
        assert!(TaskState::Thinking.can_transition_to(TaskState::Thinking));
        assert!(!TaskState::Thinking.can_transition_to(TaskState::Checking));
        assert!(!TaskState::Done.can_transition_to(TaskState::Thinking));
        assert!(!TaskState::Failed.can_transition_to(TaskState::Done));
    }

    #[test]
    fn test_task_state_presentation_is_total() {
        for state in TaskState::ALL {
            assert!(!state.reaction().is_empty());
            assert!(!state.emoji().is_empty());
            assert_eq!(TaskState::from_str(state.as_str()).unwrap(), state);
        }
        assert!(TaskState::from_str("sleeping").is_err());
    }

    #[test]
    fn test_task_state_serde_names() {
        let value = serde_json::to_value(TaskState::ForwardToOtherChannel).unwrap();
        assert_eq!(value, json!("forward_to_other_channel"));
        let parsed: TaskState = serde_json::from_value(json!("stopped_by_user")).unwrap();
        assert_eq!(parsed, TaskState::StoppedByUser);
    }

    // ========== WorkingTaskRegistry ==========

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let registry = WorkingTaskRegistry::new(store());
        assert!(registry.add_working_task(&event("C1", "1.0")).await.unwrap());
        assert!(!registry.add_working_task(&event("C1", "1.0")).await.unwrap());

        let tasks = registry.get_working_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].payload["text"], json!("please tag the release"));
    }

    #[tokio::test]
    async fn test_remove_only_matching_entries() {
        let registry = WorkingTaskRegistry::new(store());
        registry.add_working_task(&event("C1", "1.0")).await.unwrap();
        registry.add_working_task(&event("C1", "2.0")).await.unwrap();
        registry.add_working_task(&event("C2", "1.0")).await.unwrap();

        let removed = registry
            .remove_working_task(&WorkingTask::new("C1", "1.0"))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let keys: Vec<TaskKey> = registry
            .get_working_tasks()
            .await
            .unwrap()
            .iter()
            .map(WorkingTask::key)
            .collect();
        assert_eq!(keys, vec![TaskKey::new("C1", "2.0"), TaskKey::new("C2", "1.0")]);

        assert_eq!(
            registry
                .remove_working_task(&WorkingTask::new("C9", "9.9"))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_empty_registry_reads_empty_list() {
        let registry = WorkingTaskRegistry::new(store());
        assert!(registry.get_working_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let backing = store();
        let registry = WorkingTaskRegistry::new(backing.clone());
        registry.add_working_task(&event("C1", "1.0")).await.unwrap();

        let raw = backing.get(WORKING_TASKS_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            json!({
                "workingMessageEvents": [
                    {"channel": "C1", "ts": "1.0", "text": "please tag the release"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_keep_every_entry() {
        let registry = Arc::new(WorkingTaskRegistry::new(store()));
        let mut handles = Vec::new();
        for i in 0..25 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .add_working_task(&WorkingTask::new("C1", format!("{}.0", i)))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.get_working_tasks().await.unwrap().len(), 25);
        assert_eq!(registry.clear().await.unwrap(), 25);
        assert!(registry.get_working_tasks().await.unwrap().is_empty());
    }

    // ========== TaskStatusStore ==========

    #[tokio::test]
    async fn test_status_rejects_backward_transition() {
        let statuses = TaskStatusStore::new(store());
        let ev = event("C1", "1.0");
        statuses.record("w1", &ev, TaskState::Checking).await.unwrap();
        statuses.record("w1", &ev, TaskState::Thinking).await.unwrap();

        let err = statuses
            .record("w1", &ev, TaskState::Checking)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidTransition { .. }));

        let record = statuses.get("w1").await.unwrap().unwrap();
        assert_eq!(record.status, TaskState::Thinking);
    }

    #[tokio::test]
    async fn test_status_reset_only_from_done_or_failed() {
        let statuses = TaskStatusStore::new(store());
        let ev = event("C1", "1.0");
        statuses.record("w1", &ev, TaskState::Thinking).await.unwrap();
        assert!(statuses.reset("w1").await.is_err());

        statuses.record("w1", &ev, TaskState::Failed).await.unwrap();
        let record = statuses.reset("w1").await.unwrap();
        assert_eq!(record.status, TaskState::Checking);

        statuses.record("w2", &ev, TaskState::StoppedByUser).await.unwrap();
        assert!(statuses.reset("w2").await.is_err());
        assert!(matches!(
            statuses.reset("missing").await,
            Err(BotError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_key_format() {
        let backing = store();
        let statuses = TaskStatusStore::new(backing.clone());
        statuses
            .record("abc", &event("C1", "1.0"), TaskState::Checking)
            .await
            .unwrap();
        let raw = backing.get("task-abc").await.unwrap().unwrap();
        assert_eq!(raw["status"], json!("checking"));
        assert_eq!(raw["event"]["channel"], json!("C1"));
    }

    // ========== TaskOrchestrator ==========

    #[tokio::test]
    async fn test_orchestrator_lifecycle() {
        let orchestrator = TaskOrchestrator::new(store());
        assert!(orchestrator.is_idle());

        let handle = orchestrator.begin(event("C1", "1.0")).await.unwrap();
        assert_eq!(handle.state, TaskState::Checking);
        assert!(!orchestrator.is_idle());
        assert_eq!(orchestrator.registry().get_working_tasks().await.unwrap().len(), 1);

        let key = handle.key();
        orchestrator.set_state(&key, TaskState::Thinking).await.unwrap();
        assert_eq!(orchestrator.active_tasks()[0].state, TaskState::Thinking);

        orchestrator.finish(&key, TaskState::Done).await.unwrap();
        assert!(orchestrator.is_idle());
        assert!(orchestrator.registry().get_working_tasks().await.unwrap().is_empty());

        let record = orchestrator
            .statuses()
            .get(&key.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TaskState::Done);
    }

    #[tokio::test]
    async fn test_orchestrator_begin_twice_returns_same_handle() {
        let orchestrator = TaskOrchestrator::new(store());
        let first = orchestrator.begin(event("C1", "1.0")).await.unwrap();
        let second = orchestrator.begin(event("C1", "1.0")).await.unwrap();
        assert_eq!(first.started_at, second.started_at);
        assert_eq!(orchestrator.active_count(), 1);
    }

    #[tokio::test]
    async fn test_orchestrator_stop_cancels_token() {
        let orchestrator = TaskOrchestrator::new(store());
        let handle = orchestrator.begin(event("C1", "1.0")).await.unwrap();

        assert!(orchestrator.stop(&handle.key()).await.unwrap());
        assert!(handle.cancel.is_cancelled());
        assert!(orchestrator.is_idle());
        assert!(!orchestrator.stop(&handle.key()).await.unwrap());

        let record = orchestrator
            .statuses()
            .get(&handle.key().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TaskState::StoppedByUser);
    }

    #[tokio::test]
    async fn test_orchestrator_rejects_wrong_state_kinds() {
        let orchestrator = TaskOrchestrator::new(store());
        let key = orchestrator.begin(event("C1", "1.0")).await.unwrap().key();
        assert!(orchestrator.set_state(&key, TaskState::Done).await.is_err());
        assert!(orchestrator.finish(&key, TaskState::Thinking).await.is_err());
        assert!(matches!(
            orchestrator
                .finish(&TaskKey::new("C9", "9.9"), TaskState::Done)
                .await,
            Err(BotError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_orchestrator_shutdown_cancels_children() {
        let orchestrator = TaskOrchestrator::new(store());
        let a = orchestrator.begin(event("C1", "1.0")).await.unwrap();
        let b = orchestrator.begin(event("C2", "1.0")).await.unwrap();
        orchestrator.shutdown();
        assert!(a.cancel.is_cancelled());
        assert!(b.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_idle_predicate_tracks_handles() {
        let orchestrator = Arc::new(TaskOrchestrator::new(store()));
        let is_idle = orchestrator.idle_predicate();
        assert!(is_idle());
        let key = orchestrator.begin(event("C1", "1.0")).await.unwrap().key();
        assert!(!is_idle());
        orchestrator.finish(&key, TaskState::Failed).await.unwrap();
        assert!(is_idle());
    }

    struct ResumeInto {
        orchestrator: Arc<TaskOrchestrator>,
        seen: Mutex<Vec<TaskKey>>,
    }

    #[async_trait]
    impl TaskResumer for ResumeInto {
        async fn resume(&self, task: WorkingTask) -> BotResult<()> {
            self.seen.lock().push(task.key());
            if task.channel == "broken" {
                return Err(BotError::other("channel archived"));
            }
            self.orchestrator.begin(task).await.map(|_| ())
        }
    }

    #[tokio::test]
    async fn test_resume_all_survives_partial_failure() {
        let backing = store();

        // Previous process left three tasks behind, one mid-thinking.
        {
            let previous = TaskOrchestrator::new(backing.clone());
            let key = previous.begin(event("C1", "1.0")).await.unwrap().key();
            previous.set_state(&key, TaskState::Thinking).await.unwrap();
            previous.begin(event("broken", "2.0")).await.unwrap();
            previous.begin(event("C3", "3.0")).await.unwrap();
        }

        let orchestrator = Arc::new(TaskOrchestrator::new(backing));
        let resumer = ResumeInto {
            orchestrator: orchestrator.clone(),
            seen: Mutex::new(Vec::new()),
        };

        let report = orchestrator.resume_all(&resumer).await.unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.resumed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, TaskKey::new("broken", "2.0"));
        assert_eq!(resumer.seen.lock().len(), 3);

        // Progress survives the restart.
        let resumed = orchestrator
            .active_tasks()
            .into_iter()
            .find(|t| t.key() == TaskKey::new("C1", "1.0"))
            .unwrap();
        assert_eq!(resumed.state, TaskState::Thinking);
    }

    #[tokio::test]
    async fn test_begin_refuses_finished_task() {
        let orchestrator = TaskOrchestrator::new(store());
        let key = orchestrator.begin(event("C1", "1.0")).await.unwrap().key();
        orchestrator.finish(&key, TaskState::Done).await.unwrap();

        let err = orchestrator.begin(event("C1", "1.0")).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidTransition { .. }));
    }
}
