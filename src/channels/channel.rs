//! Channel trait and the message types that cross it.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// A user turn received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Name of the channel that produced the message; responses are routed back to it.
    pub channel: String,
    pub user_id: String,
    /// Key for per-conversation state.
    pub conversation_id: String,
    pub content: String,
}

impl IncomingMessage {
    /// Create a message. The conversation defaults to `"{channel}:{user_id}"`.
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            conversation_id: format!("{channel}:{user_id}"),
            content: content.to_string(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = conversation_id.to_string();
        self
    }
}

/// A reply to send back on the originating channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stream of inbound messages produced by `Channel::start`.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A conversational transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name, matched against `IncomingMessage::channel`.
    fn name(&self) -> &str;

    /// Begin receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a response for `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
