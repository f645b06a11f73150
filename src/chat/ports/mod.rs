//! Port trait definitions for the chat room.

pub mod notification;
pub mod socket;

pub use notification::NotificationSink;
pub use socket::ChatSocket;
