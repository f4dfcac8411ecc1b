//! Tests for the chat adapters

#[cfg(test)]
mod tests {
    use crate::activity::{ActivityIndicator, ActivityObserver};
    use crate::error::BotError;
    use crate::messaging::{
        ChatClient, LogChatClient, MessageRef, MockChatClient, PostTarget, ReactionActivityObserver,
        StatusMessagePublisher,
    };
    use crate::stream::StabilizedUpdate;
    use crate::tasks::{TaskKey, WorkingTask};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn update(stable: &str, delta: &str) -> StabilizedUpdate {
        StabilizedUpdate {
            stable: stable.to_string(),
            delta: delta.to_string(),
        }
    }

    #[test]
    fn test_message_ref_conversions() {
        let key = TaskKey::new("C1", "1700000000.000100");
        let message = MessageRef::from(&key);
        assert_eq!(message.to_string(), "C1:1700000000.000100");

        let task = WorkingTask::new("C2", "42.0");
        assert_eq!(MessageRef::from(&task), MessageRef::new("C2", "42.0"));

        let thread = PostTarget::thread(&message);
        assert_eq!(thread.channel, "C1");
        assert_eq!(thread.thread_ts.as_deref(), Some("1700000000.000100"));
        assert!(PostTarget::channel("C3").thread_ts.is_none());
    }

    #[tokio::test]
    async fn test_log_client_assigns_distinct_timestamps() {
        let client = LogChatClient::new();
        let target = PostTarget::channel("C1");
        let first = client.post_message(&target, "a").await.unwrap();
        let second = client.post_message(&target, "b").await.unwrap();

        assert_ne!(first.ts, second.ts);
        assert_eq!(first.channel, "C1");
        assert_eq!(client.posted_count(), 2);
        client.update_message(&first, "c").await.unwrap();
        client.add_reaction(&first, "eyes").await.unwrap();
        client.remove_reaction(&first, "eyes").await.unwrap();
    }

    // ========== StatusMessagePublisher ==========

    #[tokio::test]
    async fn test_publisher_posts_once_then_updates() {
        let mut client = MockChatClient::new();
        client
            .expect_post_message()
            .times(1)
            .withf(|target, text| target.channel == "C1" && text == "step 1")
            .returning(|target, _| Ok(MessageRef::new(target.channel.clone(), "100.1")));
        client
            .expect_update_message()
            .times(2)
            .withf(|message, text| message.ts == "100.1" && text.starts_with("step 1"))
            .returning(|_, _| Ok(()));

        let mut publisher = StatusMessagePublisher::new(Arc::new(client), PostTarget::channel("C1"));
        assert!(publisher.message().is_none());

        publisher.publish(&update("step 1", "step 1")).await.unwrap();
        publisher.publish(&update("step 1\nstep 2", "\nstep 2")).await.unwrap();
        let message = publisher
            .publish(&update("step 1\nstep 2\nstep 3", "\nstep 3"))
            .await
            .unwrap();

        assert_eq!(message, MessageRef::new("C1", "100.1"));
        assert_eq!(publisher.updates_sent(), 2);
    }

    #[tokio::test]
    async fn test_publisher_run_retries_failed_post() {
        let mut client = MockChatClient::new();
        let mut attempts = 0;
        client.expect_post_message().times(2).returning(move |_, _| {
            attempts += 1;
            if attempts == 1 {
                Err(BotError::other("chat unavailable"))
            } else {
                Ok(MessageRef::new("C1", "200.2"))
            }
        });
        client
            .expect_update_message()
            .times(1)
            .withf(|_, text| text == "a\nb\nc")
            .returning(|_, _| Ok(()));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(update("a", "a")).unwrap();
        tx.send(update("a\nb", "\nb")).unwrap();
        tx.send(update("a\nb\nc", "\nc")).unwrap();
        drop(tx);

        let publisher = StatusMessagePublisher::new(Arc::new(client), PostTarget::channel("C1"));
        let message = publisher.run(rx).await;
        assert_eq!(message, Some(MessageRef::new("C1", "200.2")));
    }

    #[tokio::test]
    async fn test_publisher_run_without_updates_posts_nothing() {
        let mut client = MockChatClient::new();
        client.expect_post_message().never();

        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);
        let publisher = StatusMessagePublisher::new(Arc::new(client), PostTarget::channel("C1"));
        assert!(publisher.run(rx).await.is_none());
    }

    // ========== ReactionActivityObserver ==========

    #[tokio::test(start_paused = true)]
    async fn test_reaction_follows_busy_period() {
        let mut client = MockChatClient::new();
        client
            .expect_add_reaction()
            .times(1)
            .withf(|message, name| message.ts == "1.0" && name == "hourglass_flowing_sand")
            .returning(|_, _| Ok(()));
        client
            .expect_remove_reaction()
            .times(1)
            .withf(|_, name| name == "hourglass_flowing_sand")
            .returning(|_, _| Ok(()));

        let observer = Arc::new(ReactionActivityObserver::new(
            Arc::new(client),
            MessageRef::new("C1", "1.0"),
        ));
        let indicator = ActivityIndicator::new(Duration::from_millis(200), observer);

        indicator.on_chunk();
        tokio::time::sleep(Duration::from_millis(100)).await;
        indicator.on_chunk();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!indicator.is_busy());
    }

    #[tokio::test]
    async fn test_reaction_failures_are_swallowed() {
        let mut client = MockChatClient::new();
        client
            .expect_add_reaction()
            .returning(|_, _| Err(BotError::other("rate limited")));
        client
            .expect_remove_reaction()
            .returning(|_, _| Err(BotError::not_found("no such reaction")));

        let observer =
            ReactionActivityObserver::with_reaction(Arc::new(client), MessageRef::new("C1", "1.0"), "eyes");
        observer.busy().await;
        observer.idle().await;
        assert_eq!(observer.message().channel, "C1");
    }
}
