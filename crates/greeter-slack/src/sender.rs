//! Outbound message sending
//!
//! [`MessageSender`] is the single "post a message" seam; [`Notifier`] wraps
//! it with the fire-and-forget policy: failures are logged, never retried and
//! never returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::api::SlackApiClient;
use crate::error::Result;

/// Posts a text message to a channel or user id
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn post_message(&self, target: &str, text: &str) -> Result<()>;
}

#[async_trait]
impl MessageSender for SlackApiClient {
    async fn post_message(&self, target: &str, text: &str) -> Result<()> {
        self.send_message(target, text).await.map(|_| ())
    }
}

/// At-most-once sender that swallows failures
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn MessageSender>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Send one message. Returns whether it was delivered.
    pub async fn send(&self, target: &str, text: &str) -> bool {
        match self.sender.post_message(target, text).await {
            Ok(()) => {
                debug!(recipient = target, "Message sent");
                true
            }
            Err(e) => {
                error!(recipient = target, "Error sending message: {}", e);
                false
            }
        }
    }
}
