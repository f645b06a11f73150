//! Conversation records, their display form, and authoritative snapshots.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ConversationId;

/// A conversation as held by the source of truth.
///
/// # Examples
///
/// ```
/// use chatfeed::feed::domain::{Conversation, ConversationId};
///
/// let conversation = Conversation::new(ConversationId::new(1), "Ada")
///     .with_content("see you")
///     .with_pinned(true);
/// assert_eq!(conversation.content, "see you");
/// assert!(conversation.pinned);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique, stable identity.
    pub id: ConversationId,
    /// Conversation title.
    pub name: String,
    /// Avatar reference, if any.
    pub image: Option<String>,
    /// Preview of the latest message text.
    pub content: String,
    /// Whether the conversation is pinned.
    pub pinned: bool,
    /// Number of unread messages.
    pub unread_count: u32,
}

impl Conversation {
    /// Creates a conversation with an empty preview.
    #[must_use]
    pub fn new(id: ConversationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image: None,
            content: String::new(),
            pinned: false,
            unread_count: 0,
        }
    }

    /// Sets the avatar reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the latest message preview.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the pinned flag.
    #[must_use]
    pub const fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Sets the unread counter.
    #[must_use]
    pub const fn with_unread_count(mut self, unread_count: u32) -> Self {
        self.unread_count = unread_count;
        self
    }
}

/// Display form of a conversation inside the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Identity shared with the source [`Conversation`].
    pub id: ConversationId,
    /// Title shown in the list; never blank.
    pub name: String,
    /// Avatar reference, if any.
    pub image: Option<String>,
    /// Preview of the latest message text.
    pub content: String,
    /// Whether the entry is pinned.
    pub pinned: bool,
    /// Number of unread messages.
    pub unread_count: u32,
    /// When the preview was last replaced by a live update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    /// Returns the first character of the title, used for avatar
    /// placeholders when no image is available.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.name.chars().find(|c| !c.is_whitespace())
    }
}

impl From<&Conversation> for FeedEntry {
    fn from(conversation: &Conversation) -> Self {
        let trimmed = conversation.name.trim();
        let name = if trimmed.is_empty() {
            format!("#{}", conversation.id)
        } else {
            trimmed.to_owned()
        };
        Self {
            id: conversation.id,
            name,
            image: conversation.image.clone(),
            content: conversation.content.clone(),
            pinned: conversation.pinned,
            unread_count: conversation.unread_count,
            updated_at: None,
        }
    }
}

/// Authoritative list of conversations as fetched from the source of truth.
///
/// Ids are unique: when the input repeats an id, the first occurrence is kept
/// and later ones are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    conversations: Vec<Conversation>,
}

impl ConversationSnapshot {
    /// Builds a snapshot, dropping repeated ids.
    #[must_use]
    pub fn new(conversations: Vec<Conversation>) -> Self {
        let mut seen = HashSet::with_capacity(conversations.len());
        let unique = conversations
            .into_iter()
            .filter(|conversation| {
                let fresh = seen.insert(conversation.id);
                if !fresh {
                    warn!(conversation_id = %conversation.id, "dropping repeated id from snapshot");
                }
                fresh
            })
            .collect();
        Self {
            conversations: unique,
        }
    }

    /// Returns an empty snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            conversations: Vec::new(),
        }
    }

    /// Returns the conversations in source order.
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Returns the conversation ids in source order.
    pub fn ids(&self) -> impl Iterator<Item = ConversationId> + '_ {
        self.conversations.iter().map(|conversation| conversation.id)
    }

    /// Returns the number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns `true` when the snapshot holds no conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

impl From<Vec<Conversation>> for ConversationSnapshot {
    fn from(conversations: Vec<Conversation>) -> Self {
        Self::new(conversations)
    }
}

impl<'de> Deserialize<'de> for ConversationSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            conversations: Vec<Conversation>,
        }

        Raw::deserialize(deserializer).map(|raw| Self::new(raw.conversations))
    }
}
