//! The externally observed feed value and its pure transitions.
//!
//! [`FeedState`] is immutable: every transition returns a new value built
//! from the previous one, so observers never see a half-applied merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentUpdate, ConversationId, ConversationSnapshot, FeedEntry};

/// Where an entry goes after its preview is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// Remove the entry and append it to the end of the list.
    #[default]
    MoveToEnd,
    /// Leave the entry where it is.
    KeepPosition,
    /// Move the entry to the front, keeping the list ordered by
    /// `updated_at`, most recent first.
    MostRecentFirst,
}

/// Outcome of merging a [`ContentUpdate`] into a [`FeedState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMerge {
    /// The update changed the feed; the new value is attached.
    Applied(FeedState),
    /// The update was already reflected; nothing to publish.
    Unchanged,
    /// No entry with the update's id exists in the current list.
    UnknownConversation,
}

/// Ordered, de-duplicated list of conversations plus the loading flag.
///
/// # Examples
///
/// ```
/// use chatfeed::feed::domain::{
///     ContentMerge, ContentUpdate, Conversation, ConversationId, ConversationSnapshot,
///     FeedState, ReorderPolicy,
/// };
///
/// let snapshot = ConversationSnapshot::new(vec![
///     Conversation::new(ConversationId::new(1), "A"),
///     Conversation::new(ConversationId::new(2), "B"),
/// ]);
/// let state = FeedState::default().with_snapshot(&snapshot);
///
/// let update = ContentUpdate::new(ConversationId::new(1), "hi");
/// let ContentMerge::Applied(next) =
///     state.merge_content(&update, ReorderPolicy::MoveToEnd, chrono::Utc::now())
/// else {
///     panic!("conversation 1 is known");
/// };
/// assert_eq!(next.ids(), vec![ConversationId::new(2), ConversationId::new(1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    conversations: Vec<FeedEntry>,
    loading: bool,
}

impl FeedState {
    /// Returns the entries in display order.
    #[must_use]
    pub fn conversations(&self) -> &[FeedEntry] {
        &self.conversations
    }

    /// Returns the entry ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<ConversationId> {
        self.conversations.iter().map(|entry| entry.id).collect()
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn get(&self, id: ConversationId) -> Option<&FeedEntry> {
        self.conversations.iter().find(|entry| entry.id == id)
    }

    /// Returns `true` while a snapshot fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns `true` when the feed holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Replaces the whole list with the snapshot's display form.
    ///
    /// Previously merged previews are discarded and `loading` is cleared.
    #[must_use]
    pub fn with_snapshot(&self, snapshot: &ConversationSnapshot) -> Self {
        Self {
            conversations: snapshot
                .conversations()
                .iter()
                .map(FeedEntry::from)
                .collect(),
            loading: false,
        }
    }

    /// Returns a copy with the loading flag set to `loading`.
    #[must_use]
    pub fn with_loading(&self, loading: bool) -> Self {
        Self {
            conversations: self.conversations.clone(),
            loading,
        }
    }

    /// Merges a preview update, last write wins.
    ///
    /// The entry's `updated_at` is set to `at` whenever the merge changes the
    /// feed. Merging the update that was just applied again yields
    /// [`ContentMerge::Unchanged`].
    #[must_use]
    pub fn merge_content(
        &self,
        update: &ContentUpdate,
        policy: ReorderPolicy,
        at: DateTime<Utc>,
    ) -> ContentMerge {
        let Some(index) = self
            .conversations
            .iter()
            .position(|entry| entry.id == update.conversation_id)
        else {
            return ContentMerge::UnknownConversation;
        };

        let last = self.conversations.len().saturating_sub(1);
        let in_place = match policy {
            ReorderPolicy::MoveToEnd => index == last,
            ReorderPolicy::KeepPosition => true,
            ReorderPolicy::MostRecentFirst => index == 0,
        };
        let same_content = self
            .conversations
            .get(index)
            .is_some_and(|entry| entry.content == update.content);
        if in_place && same_content {
            return ContentMerge::Unchanged;
        }

        let mut conversations = self.conversations.clone();
        let mut entry = conversations.remove(index);
        entry.content.clone_from(&update.content);
        entry.updated_at = Some(at);
        match policy {
            ReorderPolicy::MoveToEnd => conversations.push(entry),
            ReorderPolicy::KeepPosition => conversations.insert(index, entry),
            ReorderPolicy::MostRecentFirst => conversations.insert(0, entry),
        }

        ContentMerge::Applied(Self {
            conversations,
            loading: self.loading,
        })
    }
}
