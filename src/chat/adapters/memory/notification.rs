//! Recording notification sink.

use std::sync::{Mutex, PoisonError};

use tracing::trace;

use crate::chat::{
    domain::{ChatMessage, MessageId, OutgoingMessage},
    ports::NotificationSink,
};

#[derive(Debug, Default)]
struct Recorded {
    received: Vec<MessageId>,
    emitted: Vec<MessageId>,
}

/// [`NotificationSink`] that remembers which cues were raised.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    recorded: Mutex<Recorded>,
}

impl RecordingNotificationSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of received messages, in cue order.
    #[must_use]
    pub fn received(&self) -> Vec<MessageId> {
        self.lock().received.clone()
    }

    /// Returns the ids of sent messages, in cue order.
    #[must_use]
    pub fn emitted(&self) -> Vec<MessageId> {
        self.lock().emitted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn on_received(&self, message: &ChatMessage) {
        trace!(id = %message.id, "received cue");
        self.lock().received.push(message.id);
    }

    fn on_emit(&self, message: &OutgoingMessage) {
        trace!(id = %message.id, "emit cue");
        self.lock().emitted.push(message.id);
    }
}
