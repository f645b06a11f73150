//! In-memory adapter implementations for the chat room.

mod notification;
mod socket;

pub use notification::RecordingNotificationSink;
pub use socket::InMemoryChatSocket;
