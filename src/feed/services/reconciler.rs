//! Conversation feed reconciler.
//!
//! Merges the snapshot stream and the per-conversation content streams into
//! one ordered, de-duplicated [`FeedState`].
//!
//! Each pipeline is a single task that owns every piece of its state. Content
//! listeners run in a [`JoinSet`] owned by the pipeline and only forward
//! updates, tagged with the snapshot generation they were opened for, over a
//! channel; the pipeline applies them in arrival order and discards updates
//! whose generation has been superseded.

use std::sync::Arc;

use futures::stream::{BoxStream, Stream, StreamExt};
use mockable::Clock;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, trace, warn};

use super::store::{Epoch, FeedStore, FeedTask};
use super::subscription::FeedSubscription;
use crate::feed::{
    config::{FeedConfig, UnknownUpdatePolicy},
    domain::{ContentMerge, ContentUpdate, ConversationSnapshot},
    ports::{ContentSource, SnapshotSource},
};
use crate::resource::{Resource, resource_stream};

/// Keeps a conversation feed fresh from its sources.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use chatfeed::feed::adapters::memory::InMemoryConversationStore;
/// use chatfeed::feed::config::FeedConfig;
/// use chatfeed::feed::services::FeedReconciler;
/// use mockable::DefaultClock;
///
/// let store = Arc::new(InMemoryConversationStore::new());
/// let reconciler = FeedReconciler::new(
///     Arc::clone(&store),
///     store,
///     Arc::new(DefaultClock),
///     FeedConfig::default(),
/// );
/// assert!(reconciler.config().fetch_on_start);
/// ```
pub struct FeedReconciler<S, C, K>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
{
    snapshots: Arc<S>,
    content: Arc<C>,
    clock: Arc<K>,
    config: FeedConfig,
}

impl<S, C, K> Clone for FeedReconciler<S, C, K>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            snapshots: Arc::clone(&self.snapshots),
            content: Arc::clone(&self.content),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S, C, K> FeedReconciler<S, C, K>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
{
    /// Creates a reconciler over explicit collaborators.
    pub const fn new(
        snapshots: Arc<S>,
        content: Arc<C>,
        clock: Arc<K>,
        config: FeedConfig,
    ) -> Self {
        Self {
            snapshots,
            content,
            clock,
            config,
        }
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Starts a private pipeline and streams its states.
    ///
    /// Every call is independent. The stream yields the current (initially
    /// empty) state first and then every publication. Dropping the
    /// subscription cancels the pipeline.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn observe_feed(&self) -> FeedSubscription {
        let store = FeedStore::new();
        let task = self.attach(&store);
        FeedSubscription::new(store, task)
    }

    /// Starts a pipeline that publishes into `store`.
    ///
    /// Attaching revokes the write permission of any pipeline previously
    /// attached to the same store.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn attach(&self, store: &FeedStore) -> FeedTask {
        let epoch = store.begin_epoch();
        let pipeline = Pipeline::new(self.clone(), store.clone(), epoch);
        let handle = tokio::spawn(pipeline.run());
        FeedTask::new(store.clone(), epoch, handle)
    }

    /// Fetches the conversation list once, as a resource lifecycle.
    ///
    /// Yields `Loading`, then `Success` or `Failure`. The fetched data reaches
    /// the feed through the snapshot stream, not through this stream.
    #[must_use]
    pub fn fetch_conversations(&self) -> BoxStream<'static, Resource<ConversationSnapshot>> {
        let source = Arc::clone(&self.snapshots);
        resource_stream(async move { source.fetch_snapshot().await })
    }
}

#[derive(Debug)]
struct TaggedUpdate {
    generation: u64,
    update: ContentUpdate,
}

struct Pipeline<S, C, K>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
{
    reconciler: FeedReconciler<S, C, K>,
    store: FeedStore,
    epoch: Epoch,
    snapshots: Option<BoxStream<'static, ConversationSnapshot>>,
    fetch: Option<BoxStream<'static, Resource<ConversationSnapshot>>>,
    updates_tx: Option<mpsc::Sender<TaggedUpdate>>,
    updates_rx: mpsc::Receiver<TaggedUpdate>,
    listeners: JoinSet<()>,
    generation: u64,
}

impl<S, C, K> Pipeline<S, C, K>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
{
    fn new(reconciler: FeedReconciler<S, C, K>, store: FeedStore, epoch: Epoch) -> Self {
        let (updates_tx, updates_rx) = mpsc::channel(reconciler.config.update_buffer.max(1));
        let snapshots = Some(reconciler.snapshots.observe_snapshots());
        let fetch = reconciler
            .config
            .fetch_on_start
            .then(|| reconciler.fetch_conversations());
        Self {
            reconciler,
            store,
            epoch,
            snapshots,
            fetch,
            updates_tx: Some(updates_tx),
            updates_rx,
            listeners: JoinSet::new(),
            generation: 0,
        }
    }

    async fn run(mut self) {
        info!("feed pipeline started");
        loop {
            tokio::select! {
                next = next_item(&mut self.snapshots), if self.snapshots.is_some() => {
                    match next {
                        Some(snapshot) => self.on_snapshot(&snapshot),
                        None => self.on_snapshots_closed(),
                    }
                }
                next = next_item(&mut self.fetch), if self.fetch.is_some() => {
                    match next {
                        Some(resource) => self.on_fetch(&resource),
                        None => self.fetch = None,
                    }
                }
                Some(tagged) = self.updates_rx.recv() => self.on_update(tagged),
                Some(joined) = self.listeners.join_next(), if !self.listeners.is_empty() => {
                    on_listener_exit(joined);
                }
                else => break,
            }
        }
        info!("feed pipeline stopped");
    }

    fn on_snapshot(&mut self, snapshot: &ConversationSnapshot) {
        self.generation = self.generation.wrapping_add(1);
        self.listeners.abort_all();

        let published = self
            .store
            .publish(self.epoch, |state| Some(state.with_snapshot(snapshot)));
        if !published {
            debug!("snapshot ignored; pipeline no longer owns the feed");
            return;
        }
        info!(
            generation = self.generation,
            conversations = snapshot.len(),
            "snapshot applied"
        );

        let Some(sink) = &self.updates_tx else {
            return;
        };
        for conversation_id in snapshot.ids() {
            let updates = self.reconciler.content.observe_content(conversation_id);
            self.listeners
                .spawn(forward_updates(updates, sink.clone(), self.generation));
        }
    }

    fn on_snapshots_closed(&mut self) {
        debug!("snapshot stream ended");
        self.snapshots = None;
        self.updates_tx = None;
    }

    fn on_fetch(&mut self, resource: &Resource<ConversationSnapshot>) {
        let loading = match resource {
            Resource::Loading => true,
            Resource::Success(snapshot) => {
                debug!(conversations = snapshot.len(), "conversation fetch succeeded");
                false
            }
            Resource::Failure(failure) => {
                warn!(code = %failure.code, message = %failure.message, "conversation fetch failed");
                false
            }
        };
        self.store.publish(self.epoch, |state| {
            (state.is_loading() != loading).then(|| state.with_loading(loading))
        });
        if resource.is_terminal() {
            self.fetch = None;
        }
    }

    fn on_update(&mut self, tagged: TaggedUpdate) {
        let TaggedUpdate { generation, update } = tagged;
        if generation != self.generation {
            trace!(conversation_id = %update.conversation_id, "discarding stale update");
            return;
        }

        let policy = self.reconciler.config.reorder;
        let at = self.reconciler.clock.utc();
        let mut unknown = false;
        let published = self.store.publish(self.epoch, |state| {
            match state.merge_content(&update, policy, at) {
                ContentMerge::Applied(next) => Some(next),
                ContentMerge::Unchanged => None,
                ContentMerge::UnknownConversation => {
                    unknown = true;
                    None
                }
            }
        });
        if published {
            trace!(conversation_id = %update.conversation_id, "content merged");
        }
        if unknown {
            self.on_unknown(&update);
        }
    }

    fn on_unknown(&mut self, update: &ContentUpdate) {
        match self.reconciler.config.unknown_update {
            UnknownUpdatePolicy::Ignore => {
                debug!(conversation_id = %update.conversation_id, "dropping update for unknown conversation");
            }
            UnknownUpdatePolicy::Refresh => {
                if self.fetch.is_none() {
                    info!(conversation_id = %update.conversation_id, "unknown conversation; refreshing");
                    self.fetch = Some(self.reconciler.fetch_conversations());
                }
            }
        }
    }
}

async fn next_item<T>(stream: &mut Option<BoxStream<'static, T>>) -> Option<T> {
    match stream.as_mut() {
        Some(stream) => stream.next().await,
        None => None,
    }
}

async fn forward_updates<U>(mut updates: U, sink: mpsc::Sender<TaggedUpdate>, generation: u64)
where
    U: Stream<Item = ContentUpdate> + Unpin,
{
    while let Some(update) = updates.next().await {
        if sink.send(TaggedUpdate { generation, update }).await.is_err() {
            return;
        }
    }
}

fn on_listener_exit(joined: Result<(), JoinError>) {
    match joined {
        Ok(()) => debug!("content stream ended"),
        Err(err) if err.is_panic() => warn!(error = %err, "content listener panicked"),
        Err(_) => {}
    }
}
