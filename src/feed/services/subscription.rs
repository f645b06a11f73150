//! Stream of feed states owned by a single subscriber.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use super::store::{FeedStore, FeedTask};
use crate::feed::domain::FeedState;

/// Infinite stream of [`FeedState`] values for one subscriber.
///
/// Created by [`super::FeedReconciler::observe_feed`]. Yields the current
/// state first and then each publication; intermediate states may be
/// skipped by a slow consumer, the latest one is never lost. Dropping the
/// subscription cancels its pipeline.
pub struct FeedSubscription {
    store: FeedStore,
    states: BoxStream<'static, FeedState>,
    task: FeedTask,
}

impl FeedSubscription {
    pub(crate) fn new(store: FeedStore, task: FeedTask) -> Self {
        let states = WatchStream::new(store.subscribe()).boxed();
        Self {
            store,
            states,
            task,
        }
    }

    /// Returns the latest published state without waiting.
    #[must_use]
    pub fn current(&self) -> FeedState {
        self.store.current()
    }

    /// Returns the store the pipeline publishes into.
    #[must_use]
    pub const fn store(&self) -> &FeedStore {
        &self.store
    }

    /// Returns `true` once the pipeline has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the pipeline and every listener it owns.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Stream for FeedSubscription {
    type Item = FeedState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.states.poll_next_unpin(cx)
    }
}
