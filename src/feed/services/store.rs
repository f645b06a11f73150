//! Shared holder of the published [`FeedState`].
//!
//! A store admits one writer at a time. Each pipeline attached to the store
//! receives an epoch; publications are checked against the current epoch
//! under a mutex, so once a pipeline's epoch is retired none of its writes
//! can land.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::feed::domain::FeedState;

/// Write permission for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Epoch(u64);

#[derive(Debug)]
struct StoreInner {
    state: watch::Sender<FeedState>,
    epoch: Mutex<u64>,
}

/// Observable container for the current [`FeedState`].
///
/// Cloning shares the container. The state survives the pipelines that
/// write to it and is destroyed with the last clone.
#[derive(Debug, Clone)]
pub struct FeedStore {
    inner: Arc<StoreInner>,
}

impl Default for FeedStore {
    fn default() -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            inner: Arc::new(StoreInner {
                state,
                epoch: Mutex::new(0),
            }),
        }
    }
}

impl FeedStore {
    /// Creates a store holding an empty, idle feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a receiver that observes every publication.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.inner.state.subscribe()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn current(&self) -> FeedState {
        self.inner.state.borrow().clone()
    }

    /// Grants a new epoch, revoking every earlier one.
    pub(crate) fn begin_epoch(&self) -> Epoch {
        let mut guard = self.inner.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.wrapping_add(1);
        Epoch(*guard)
    }

    /// Revokes `epoch` if it is still the current one.
    pub(crate) fn retire(&self, epoch: Epoch) {
        let mut guard = self.inner.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard == epoch.0 {
            *guard = guard.wrapping_add(1);
        }
    }

    /// Applies `transition` to the current state on behalf of `epoch`.
    ///
    /// `transition` returns the next state, or `None` to leave the state
    /// untouched. Observers are notified only when a new state is stored.
    /// Returns `false` when the epoch has been revoked or nothing changed.
    pub(crate) fn publish<F>(&self, epoch: Epoch, transition: F) -> bool
    where
        F: FnOnce(&FeedState) -> Option<FeedState>,
    {
        let guard = self.inner.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard != epoch.0 {
            return false;
        }
        let published = self.inner.state.send_if_modified(|state| {
            transition(state).is_some_and(|next| {
                *state = next;
                true
            })
        });
        drop(guard);
        published
    }
}

/// Handle to a running feed pipeline.
///
/// Dropping the handle cancels the pipeline and every per-conversation
/// listener it owns. After [`FeedTask::cancel`] returns, the pipeline can no
/// longer publish.
#[derive(Debug)]
pub struct FeedTask {
    store: FeedStore,
    epoch: Epoch,
    handle: JoinHandle<()>,
}

impl FeedTask {
    pub(crate) fn new(store: FeedStore, epoch: Epoch, handle: JoinHandle<()>) -> Self {
        Self {
            store,
            epoch,
            handle,
        }
    }

    /// Cancels the pipeline.
    pub fn cancel(self) {
        drop(self);
    }

    /// Returns `true` once the pipeline has stopped on its own or been
    /// cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FeedTask {
    fn drop(&mut self) {
        self.store.retire(self.epoch);
        self.handle.abort();
    }
}
