//! Session-driven activation of the feed pipeline.

use std::sync::Arc;

use futures::StreamExt;
use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::reconciler::FeedReconciler;
use super::store::{FeedStore, FeedTask};
use crate::feed::{
    domain::{FeedState, UserId},
    ports::{ContentSource, SessionSignal, SnapshotSource},
};

/// Runs the feed only while a user is signed in.
///
/// The controller owns a [`FeedStore`] that outlives individual pipelines:
/// when the session ends the pipeline is cancelled, and the last published
/// state stays visible until the next session starts a new pipeline.
pub struct SessionFeedController<S, C, K, A>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
    A: SessionSignal + 'static,
{
    reconciler: FeedReconciler<S, C, K>,
    session: Arc<A>,
    store: FeedStore,
}

impl<S, C, K, A> SessionFeedController<S, C, K, A>
where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
    A: SessionSignal + 'static,
{
    /// Creates a controller with an empty store.
    #[must_use]
    pub fn new(reconciler: FeedReconciler<S, C, K>, session: Arc<A>) -> Self {
        Self {
            reconciler,
            session,
            store: FeedStore::new(),
        }
    }

    /// Returns the store the feed is published into.
    #[must_use]
    pub const fn store(&self) -> &FeedStore {
        &self.store
    }

    /// Returns a receiver that observes every publication.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.store.subscribe()
    }

    /// Starts following the session signal.
    ///
    /// A signed-in user starts a pipeline; a different user restarts it;
    /// `None` or the end of the session stream cancels it. Dropping the
    /// returned handle cancels the whole task tree.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(&self) -> ControllerTask {
        let reconciler = self.reconciler.clone();
        let session = Arc::clone(&self.session);
        let store = self.store.clone();
        ControllerTask {
            handle: tokio::spawn(follow_session(reconciler, session, store)),
        }
    }
}

/// Handle to a running [`SessionFeedController`].
///
/// Dropping the handle cancels the session loop and the active pipeline.
#[derive(Debug)]
pub struct ControllerTask {
    handle: JoinHandle<()>,
}

impl ControllerTask {
    /// Stops following the session and cancels the active pipeline.
    pub fn cancel(self) {
        drop(self);
    }

    /// Returns `true` once the session loop has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ControllerTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn follow_session<S, C, K, A>(
    reconciler: FeedReconciler<S, C, K>,
    session: Arc<A>,
    store: FeedStore,
) where
    S: SnapshotSource + 'static,
    C: ContentSource + 'static,
    K: Clock + Send + Sync + 'static,
    A: SessionSignal + 'static,
{
    let mut sessions = session.observe_current_session();
    let mut active: Option<(UserId, FeedTask)> = None;

    while let Some(current) = sessions.next().await {
        match current {
            Some(user) if active.as_ref().is_some_and(|(owner, _)| *owner == user) => {}
            Some(user) => {
                if let Some((previous, task)) = active.take() {
                    info!(%previous, "session changed; restarting feed");
                    task.cancel();
                }
                info!(%user, "activating feed");
                active = Some((user, reconciler.attach(&store)));
            }
            None => {
                if let Some((user, task)) = active.take() {
                    task.cancel();
                    info!(%user, "session ended; feed suspended");
                }
            }
        }
    }

    if let Some((user, task)) = active.take() {
        task.cancel();
        info!(%user, "session signal closed; feed suspended");
    }
}
