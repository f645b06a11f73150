//! Chatfeed: the conversation feed of a messaging client.
//!
//! This crate keeps an ordered, de-duplicated list of conversations fresh
//! from a snapshot source and per-conversation live previews, gated by the
//! user's session, and drives the chat room for one open conversation.
//!
//! # Architecture
//!
//! Chatfeed follows hexagonal architecture principles:
//!
//! - **Domain**: Pure values with no infrastructure dependencies
//! - **Ports**: Trait interfaces for every collaborator
//! - **Adapters**: In-memory implementations of the ports
//! - **Services**: Task trees that merge sources into observable state
//!
//! # Modules
//!
//! - [`resource`]: Loading/success/failure envelope for one-shot fetches
//! - [`feed`]: Conversation feed reconciler and its session controller
//! - [`chat`]: Chat room for a single conversation
//! - [`telemetry`]: Logging bootstrap

pub mod chat;
pub mod feed;
pub mod resource;
pub mod telemetry;
