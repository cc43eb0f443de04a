//! Incoming chat messages.

use serde::{Deserialize, Serialize};

/// Identifier of a chat, opaque to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One text message received from the transport.
///
/// Created per transport event and discarded after orchestration completes.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Chat the message arrived from
    pub chat_id: ChatId,

    /// Transport-level message id (used for reply-to)
    pub message_id: i64,

    /// Raw message text
    pub text: String,
}

impl IncomingMessage {
    /// Create a new incoming message
    pub fn new(chat_id: ChatId, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = IncomingMessage::new(ChatId(42), 7, "Привет");
        assert_eq!(msg.chat_id, ChatId(42));
        assert_eq!(msg.text, "Привет");
    }
}
