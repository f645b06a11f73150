//! Port for live per-conversation preview updates.

use futures::stream::BoxStream;

use crate::feed::domain::{ContentUpdate, ConversationId};

/// Source of preview updates, one independent stream per conversation.
///
/// Dropping a returned stream must release its subscription.
pub trait ContentSource: Send + Sync {
    /// Streams updates for a single conversation.
    fn observe_content(
        &self,
        conversation_id: ConversationId,
    ) -> BoxStream<'static, ContentUpdate>;
}
