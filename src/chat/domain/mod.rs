//! Domain types for a single open conversation.

mod ids;
mod message;
mod state;

pub use ids::MessageId;
pub use message::{ChatMessage, OutgoingMessage};
pub use state::ChatState;
