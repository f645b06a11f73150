//! In-memory conversation cache implementing the snapshot and content ports.
//!
//! Models the client's local cache in front of a remote backend: a cached
//! snapshot observed through a watch channel, a remote list that
//! [`SnapshotSource::fetch_snapshot`] copies into the cache, and one
//! broadcast channel per conversation for live previews.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tracing::{debug, warn};

use crate::feed::{
    domain::{ContentUpdate, Conversation, ConversationId, ConversationSnapshot},
    error::{SourceError, SourceResult},
    ports::{ContentSource, SnapshotSource},
};

const DEFAULT_CONTENT_CAPACITY: usize = 32;

#[derive(Debug)]
struct StoreInner {
    cached: watch::Sender<ConversationSnapshot>,
    remote: RwLock<Vec<Conversation>>,
    pending_failure: RwLock<Option<SourceError>>,
    content: RwLock<HashMap<ConversationId, broadcast::Sender<ContentUpdate>>>,
    content_capacity: usize,
    fetches: AtomicUsize,
}

/// In-memory implementation of [`SnapshotSource`] and [`ContentSource`].
///
/// Cloning shares the underlying state.
///
/// # Example
///
/// ```
/// use chatfeed::feed::adapters::memory::InMemoryConversationStore;
/// use chatfeed::feed::domain::{Conversation, ConversationId};
///
/// let store = InMemoryConversationStore::new();
/// store.set_remote(vec![Conversation::new(ConversationId::new(1), "A")]);
/// assert!(store.cached_snapshot().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryConversationStore {
    inner: Arc<StoreInner>,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::with_content_capacity(DEFAULT_CONTENT_CAPACITY)
    }
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose per-conversation channels buffer
    /// `capacity` updates for slow observers.
    #[must_use]
    pub fn with_content_capacity(capacity: usize) -> Self {
        let (cached, _) = watch::channel(ConversationSnapshot::empty());
        Self {
            inner: Arc::new(StoreInner {
                cached,
                remote: RwLock::new(Vec::new()),
                pending_failure: RwLock::new(None),
                content: RwLock::new(HashMap::new()),
                content_capacity: capacity.max(1),
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Replaces the remote list returned by the next fetch.
    pub fn set_remote(&self, conversations: Vec<Conversation>) {
        *self
            .inner
            .remote
            .write()
            .unwrap_or_else(PoisonError::into_inner) = conversations;
    }

    /// Replaces the cached list directly, as a local database write would.
    pub fn publish_snapshot(&self, conversations: Vec<Conversation>) {
        let snapshot = ConversationSnapshot::new(conversations);
        debug!(count = snapshot.len(), "publishing cached snapshot");
        self.inner.cached.send_replace(snapshot);
    }

    /// Returns the cached snapshot.
    #[must_use]
    pub fn cached_snapshot(&self) -> ConversationSnapshot {
        self.inner.cached.borrow().clone()
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next_fetch(&self, error: SourceError) {
        *self
            .inner
            .pending_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Returns how many fetches have been attempted.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Delivers a preview update to the conversation's observers.
    ///
    /// Returns the number of observers reached; updates for conversations
    /// nobody observes are dropped.
    pub fn push_content(&self, update: ContentUpdate) -> usize {
        let guard = self
            .inner
            .content
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&update.conversation_id)
            .and_then(|sender| sender.send(update).ok())
            .unwrap_or(0)
    }

    /// Returns the number of live observers for a conversation.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn content_subscribers(&self, conversation_id: ConversationId) -> usize {
        self.inner
            .content
            .read()
            .map(|guard| {
                guard
                    .get(&conversation_id)
                    .map_or(0, broadcast::Sender::receiver_count)
            })
            .unwrap_or(0)
    }

    fn content_receiver(
        &self,
        conversation_id: ConversationId,
    ) -> broadcast::Receiver<ContentUpdate> {
        let mut guard = self
            .inner
            .content
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(self.inner.content_capacity).0)
            .subscribe()
    }
}

#[async_trait]
impl SnapshotSource for InMemoryConversationStore {
    fn observe_snapshots(&self) -> BoxStream<'static, ConversationSnapshot> {
        WatchStream::new(self.inner.cached.subscribe()).boxed()
    }

    async fn fetch_snapshot(&self) -> SourceResult<ConversationSnapshot> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .inner
            .pending_failure
            .write()
            .map_err(|e| SourceError::unavailable(format!("lock poisoned: {e}")))?
            .take();
        if let Some(error) = failure {
            return Err(error);
        }

        let snapshot = {
            let remote = self
                .inner
                .remote
                .read()
                .map_err(|e| SourceError::unavailable(format!("lock poisoned: {e}")))?;
            ConversationSnapshot::new(remote.clone())
        };
        self.inner.cached.send_replace(snapshot.clone());
        Ok(snapshot)
    }
}

impl ContentSource for InMemoryConversationStore {
    fn observe_content(
        &self,
        conversation_id: ConversationId,
    ) -> BoxStream<'static, ContentUpdate> {
        BroadcastStream::new(self.content_receiver(conversation_id))
            .filter_map(move |item| {
                future::ready(match item {
                    Ok(update) => Some(update),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(%conversation_id, skipped, "content observer lagged");
                        None
                    }
                })
            })
            .boxed()
    }
}
