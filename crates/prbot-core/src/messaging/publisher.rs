//! Live status message fed by stabilized output

use super::client::ChatClient;
use super::types::{MessageRef, PostTarget};
use crate::error::BotResult;
use crate::stream::StabilizedUpdate;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Posts one status message per stream, then keeps editing it so it shows
/// the whole stable prefix.
pub struct StatusMessagePublisher {
    client: Arc<dyn ChatClient>,
    target: PostTarget,
    message: Option<MessageRef>,
    updates_sent: usize,
}

impl StatusMessagePublisher {
    pub fn new(client: Arc<dyn ChatClient>, target: PostTarget) -> Self {
        Self {
            client,
            target,
            message: None,
            updates_sent: 0,
        }
    }

    /// The status message, once posted
    pub fn message(&self) -> Option<&MessageRef> {
        self.message.as_ref()
    }

    /// Edits made after the initial post
    pub fn updates_sent(&self) -> usize {
        self.updates_sent
    }

    pub async fn publish(&mut self, update: &StabilizedUpdate) -> BotResult<MessageRef> {
        match &self.message {
            Some(message) => {
                self.client.update_message(message, &update.stable).await?;
                self.updates_sent += 1;
                Ok(message.clone())
            }
            None => {
                let message = self.client.post_message(&self.target, &update.stable).await?;
                debug!(message = %message, "status message posted");
                self.message = Some(message.clone());
                Ok(message)
            }
        }
    }

    /// Publish every update until the stream ends. A failed call is logged
    /// and the next update retries with the newer text.
    pub async fn run(mut self, mut updates: mpsc::UnboundedReceiver<StabilizedUpdate>) -> Option<MessageRef> {
        while let Some(update) = updates.recv().await {
            if let Err(e) = self.publish(&update).await {
                warn!(channel = %self.target.channel, error = %e, "failed to publish status");
            }
        }
        self.message
    }
}
