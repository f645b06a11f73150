//! In-memory session signal.

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::info;

use crate::feed::{domain::UserId, ports::SessionSignal};

/// In-memory implementation of [`SessionSignal`].
///
/// Observers see the latest value; rapid sign-out/sign-in pairs may be
/// observed as a single change.
#[derive(Debug, Clone)]
pub struct InMemorySession {
    current: watch::Sender<Option<UserId>>,
}

impl Default for InMemorySession {
    fn default() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }
}

impl InMemorySession {
    /// Creates a signal with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal with `user` already signed in.
    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        let (current, _) = watch::channel(Some(user));
        Self { current }
    }

    /// Signs `user` in.
    pub fn sign_in(&self, user: UserId) {
        info!(%user, "session started");
        self.current.send_replace(Some(user));
    }

    /// Ends the current session.
    pub fn sign_out(&self) {
        if let Some(user) = self.current.send_replace(None) {
            info!(%user, "session ended");
        }
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<UserId> {
        *self.current.borrow()
    }
}

impl SessionSignal for InMemorySession {
    fn observe_current_session(&self) -> BoxStream<'static, Option<UserId>> {
        WatchStream::new(self.current.subscribe()).boxed()
    }
}
