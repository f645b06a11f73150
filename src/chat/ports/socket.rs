//! Port for the real-time chat transport.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::chat::{
    domain::{ChatMessage, OutgoingMessage},
    error::ChatResult,
};
use crate::feed::domain::{ConversationId, UserId};

/// Bidirectional message transport for one session at a time.
///
/// # Implementation Notes
///
/// - `open_session` must fail with [`crate::chat::error::ChatError::AlreadyConnected`]
///   while a session is open.
/// - `observe_messages` streams every message delivered to the
///   conversation, including echoes of messages sent through this socket.
/// - `close_session` is idempotent.
#[async_trait]
pub trait ChatSocket: Send + Sync {
    /// Opens a session for `user` in `conversation`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::chat::error::ChatError::SessionRejected`] when the
    /// server refuses the session.
    async fn open_session(&self, user: UserId, conversation: ConversationId) -> ChatResult<()>;

    /// Streams messages delivered to `conversation`.
    fn observe_messages(&self, conversation: ConversationId) -> BoxStream<'static, ChatMessage>;

    /// Sends a message over the open session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::chat::error::ChatError::NotConnected`] when no session
    /// is open for the message's conversation.
    async fn send_message(&self, message: &OutgoingMessage) -> ChatResult<()>;

    /// Closes the open session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`crate::chat::error::ChatError::Transport`] when the transport
    /// fails while closing.
    async fn close_session(&self) -> ChatResult<()>;
}
