//! Conversation feed: an ordered, de-duplicated list of conversations kept
//! fresh from asynchronous sources.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: pure values ([`domain::FeedState`], [`domain::ConversationSnapshot`],
//!   [`domain::ContentUpdate`])
//! - **Ports**: collaborator traits ([`ports::SnapshotSource`],
//!   [`ports::ContentSource`], [`ports::SessionSignal`], [`ports::HeadlineSource`])
//! - **Adapters**: in-memory implementations ([`adapters::memory`])
//! - **Services**: the reconciler and its session controller ([`services`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chatfeed::feed::adapters::memory::InMemoryConversationStore;
//! use chatfeed::feed::config::FeedConfig;
//! use chatfeed::feed::domain::{Conversation, ConversationId};
//! use chatfeed::feed::services::FeedReconciler;
//! use futures::StreamExt;
//! use mockable::DefaultClock;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryConversationStore::new());
//! store.set_remote(vec![Conversation::new(ConversationId::new(1), "A")]);
//!
//! let reconciler = FeedReconciler::new(
//!     Arc::clone(&store),
//!     Arc::clone(&store),
//!     Arc::new(DefaultClock),
//!     FeedConfig::default(),
//! );
//! let mut feed = reconciler.observe_feed();
//! while let Some(state) = feed.next().await {
//!     if state.len() == 1 {
//!         break;
//!     }
//! }
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
