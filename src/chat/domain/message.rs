//! Chat messages, outgoing and delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;
use crate::feed::domain::{ConversationId, UserId};

/// A message composed locally and handed to the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Identity carried through to the delivered message.
    pub id: MessageId,
    /// Target conversation.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender: UserId,
    /// Message body.
    pub text: String,
    /// When the author pressed send.
    pub created_at: DateTime<Utc>,
}

impl OutgoingMessage {
    /// Composes a message with a fresh id.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender: UserId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            sender,
            text: text.into(),
            created_at,
        }
    }

    /// Turns the message into its delivered form.
    #[must_use]
    pub fn delivered(self, sent_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: self.id,
            conversation_id: self.conversation_id,
            sender: self.sender,
            text: self.text,
            sent_at,
        }
    }
}

/// A message as delivered by the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identity.
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender: UserId,
    /// Message body.
    pub text: String,
    /// Delivery time assigned by the socket.
    pub sent_at: DateTime<Utc>,
}
