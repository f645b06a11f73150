//! Error types for the chat room.

use std::sync::Arc;
use thiserror::Error;

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors raised by the chat room and its socket.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// No session is open.
    #[error("chat session is not connected")]
    NotConnected,

    /// A session is already open.
    #[error("chat session is already connected")]
    AlreadyConnected,

    /// The server refused to open the session.
    #[error("chat session rejected: {0}")]
    SessionRejected(String),

    /// The transport failed.
    #[error("chat transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChatError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
