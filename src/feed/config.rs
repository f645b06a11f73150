//! Tunables for the feed reconciler.
//!
//! The defaults reproduce the behaviour of the messaging client the feed was
//! extracted from: updated conversations move to the end of the list and
//! updates for unknown conversations are dropped.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::domain::ReorderPolicy;

/// What to do with a content update whose conversation is not in the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownUpdatePolicy {
    /// Drop the update.
    #[default]
    Ignore,
    /// Start a new snapshot fetch so the conversation can appear.
    Refresh,
}

/// Errors raised while loading a [`FeedConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read feed config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for this schema.
    #[error("failed to parse feed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid feed config: {0}")]
    Invalid(String),
}

/// Reconciler configuration.
///
/// # Examples
///
/// ```
/// use chatfeed::feed::config::{FeedConfig, UnknownUpdatePolicy};
/// use chatfeed::feed::domain::ReorderPolicy;
///
/// let config = FeedConfig::default();
/// assert_eq!(config.reorder, ReorderPolicy::MoveToEnd);
///
/// let parsed = FeedConfig::from_json_str(r#"{"unknown_update": "refresh"}"#)
///     .expect("valid config");
/// assert_eq!(parsed.unknown_update, UnknownUpdatePolicy::Refresh);
/// assert!(parsed.fetch_on_start);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Placement of an entry after its preview changes.
    pub reorder: ReorderPolicy,
    /// Handling of updates for conversations absent from the feed.
    pub unknown_update: UnknownUpdatePolicy,
    /// Whether a pipeline starts a snapshot fetch as soon as it starts.
    pub fetch_on_start: bool,
    /// Capacity of the channel carrying updates from per-conversation
    /// listeners to the pipeline.
    pub update_buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reorder: ReorderPolicy::MoveToEnd,
            unknown_update: UnknownUpdatePolicy::Ignore,
            fetch_on_start: true,
            update_buffer: 64,
        }
    }
}

impl FeedConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`FeedConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `update_buffer` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_buffer == 0 {
            return Err(ConfigError::Invalid(
                "update_buffer must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets the reorder policy.
    #[must_use]
    pub const fn with_reorder(mut self, reorder: ReorderPolicy) -> Self {
        self.reorder = reorder;
        self
    }

    /// Sets the unknown-update policy.
    #[must_use]
    pub const fn with_unknown_update(mut self, policy: UnknownUpdatePolicy) -> Self {
        self.unknown_update = policy;
        self
    }

    /// Enables or disables the initial fetch.
    #[must_use]
    pub const fn with_fetch_on_start(mut self, fetch_on_start: bool) -> Self {
        self.fetch_on_start = fetch_on_start;
        self
    }

    /// Sets the listener channel capacity. Zero is raised to one.
    #[must_use]
    pub fn with_update_buffer(mut self, update_buffer: usize) -> Self {
        self.update_buffer = update_buffer.max(1);
        self
    }
}
