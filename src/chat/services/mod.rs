//! Application services for the chat room.

mod room;

pub use room::ChatRoom;
