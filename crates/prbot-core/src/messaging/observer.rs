use super::client::ChatClient;
use super::types::MessageRef;
use crate::activity::ActivityObserver;
use crate::tasks::TaskState;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Shows a reaction on a message while its stream is busy.
///
/// Chat failures are logged and never reach the indicator.
pub struct ReactionActivityObserver {
    client: Arc<dyn ChatClient>,
    message: MessageRef,
    reaction: String,
}

impl ReactionActivityObserver {
    /// Uses the reaction of [`TaskState::Thinking`]
    pub fn new(client: Arc<dyn ChatClient>, message: MessageRef) -> Self {
        Self::with_reaction(client, message, TaskState::Thinking.reaction())
    }

    pub fn with_reaction(
        client: Arc<dyn ChatClient>,
        message: MessageRef,
        reaction: impl Into<String>,
    ) -> Self {
        Self {
            client,
            message,
            reaction: reaction.into(),
        }
    }

    pub fn message(&self) -> &MessageRef {
        &self.message
    }
}

#[async_trait]
impl ActivityObserver for ReactionActivityObserver {
    async fn busy(&self) {
        if let Err(e) = self.client.add_reaction(&self.message, &self.reaction).await {
            warn!(message = %self.message, reaction = %self.reaction, error = %e, "failed to add reaction");
        }
    }

    async fn idle(&self) {
        if let Err(e) = self.client.remove_reaction(&self.message, &self.reaction).await {
            warn!(message = %self.message, reaction = %self.reaction, error = %e, "failed to remove reaction");
        }
    }
}
