use super::types::{MessageRef, PostTarget};
use crate::error::BotResult;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Outbound chat operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a new message and return its reference
    async fn post_message(&self, target: &PostTarget, text: &str) -> BotResult<MessageRef>;

    /// Replace the text of an existing message
    async fn update_message(&self, message: &MessageRef, text: &str) -> BotResult<()>;

    async fn add_reaction(&self, message: &MessageRef, name: &str) -> BotResult<()>;

    async fn remove_reaction(&self, message: &MessageRef, name: &str) -> BotResult<()>;
}

/// [`ChatClient`] that writes every call to the log.
///
/// Posted messages get a synthetic timestamp.
#[derive(Debug, Default)]
pub struct LogChatClient {
    posted: AtomicU64,
}

impl LogChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted_count(&self) -> u64 {
        self.posted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for LogChatClient {
    async fn post_message(&self, target: &PostTarget, text: &str) -> BotResult<MessageRef> {
        let seq = self.posted.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let ts = format!("{}.{:06}", now.timestamp(), seq % 1_000_000);
        info!(
            channel = %target.channel,
            thread_ts = ?target.thread_ts,
            ts = %ts,
            chars = text.chars().count(),
            "post message"
        );
        Ok(MessageRef::new(target.channel.clone(), ts))
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> BotResult<()> {
        info!(channel = %message.channel, ts = %message.ts, chars = text.chars().count(), "update message");
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageRef, name: &str) -> BotResult<()> {
        info!(channel = %message.channel, ts = %message.ts, reaction = name, "add reaction");
        Ok(())
    }

    async fn remove_reaction(&self, message: &MessageRef, name: &str) -> BotResult<()> {
        info!(channel = %message.channel, ts = %message.ts, reaction = name, "remove reaction");
        Ok(())
    }
}
