//! Observable state of an open chat room.

use serde::{Deserialize, Serialize};

use super::ChatMessage;
use crate::feed::domain::ConversationId;

/// Messages of the connected conversation, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    conversation: Option<ConversationId>,
}

impl ChatState {
    /// Returns the received messages, newest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the connected conversation, if any.
    #[must_use]
    pub const fn conversation(&self) -> Option<ConversationId> {
        self.conversation
    }

    /// Returns `true` while a session is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.conversation.is_some()
    }

    /// Records the connected conversation.
    pub(crate) const fn connect(&mut self, conversation: ConversationId) {
        self.conversation = Some(conversation);
    }

    /// Forgets the connected conversation. Received messages are kept.
    pub(crate) const fn disconnect(&mut self) {
        self.conversation = None;
    }

    /// Prepends `message` unless a message with the same id is present.
    ///
    /// Returns `true` when the state changed.
    pub(crate) fn receive(&mut self, message: &ChatMessage) -> bool {
        if self.messages.iter().any(|known| known.id == message.id) {
            return false;
        }
        self.messages.insert(0, message.clone());
        true
    }
}
