//! Domain types for the conversation feed.
//!
//! Pure values with no infrastructure dependencies. Every transition on
//! [`FeedState`] returns a new value.

mod conversation;
mod ids;
mod state;
mod update;

pub use conversation::{Conversation, ConversationSnapshot, FeedEntry};
pub use ids::{ConversationId, UserId};
pub use state::{ContentMerge, FeedState, ReorderPolicy};
pub use update::ContentUpdate;
