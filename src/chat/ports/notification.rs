//! Port for user-facing notification cues.

use crate::chat::domain::{ChatMessage, OutgoingMessage};

/// Receives a cue whenever a message arrives or leaves.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Called once per newly received message.
    fn on_received(&self, message: &ChatMessage);

    /// Called once per message sent successfully.
    fn on_emit(&self, message: &OutgoingMessage);
}
