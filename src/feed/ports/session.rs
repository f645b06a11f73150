//! Port for the authentication session signal.

use futures::stream::BoxStream;

use crate::feed::domain::UserId;

/// Signal describing whether a user is signed in.
pub trait SessionSignal: Send + Sync {
    /// Streams the current session: `Some(user)` while signed in, `None`
    /// otherwise. The current value is yielded first.
    fn observe_current_session(&self) -> BoxStream<'static, Option<UserId>>;
}
