//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and demonstrations without a backend.

mod conversation_store;
mod headline;
mod session;

pub use conversation_store::InMemoryConversationStore;
pub use headline::StaticHeadlineSource;
pub use session::InMemorySession;
