//! Chat room for a single open conversation.
//!
//! Follows the same layout as [`crate::feed`]: domain values in [`domain`],
//! collaborator traits in [`ports`], in-memory implementations in
//! [`adapters`], and the [`services::ChatRoom`] orchestrating them.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
