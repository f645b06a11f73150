//! Incremental preview updates for a single conversation.

use serde::{Deserialize, Serialize};

use super::ConversationId;

/// Latest message text for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUpdate {
    /// Conversation the preview belongs to.
    pub conversation_id: ConversationId,
    /// New preview text.
    pub content: String,
}

impl ContentUpdate {
    /// Creates a content update.
    #[must_use]
    pub fn new(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
        }
    }
}
