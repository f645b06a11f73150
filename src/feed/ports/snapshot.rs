//! Port for the authoritative conversation list.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::feed::{domain::ConversationSnapshot, error::SourceResult};

/// Source of conversation snapshots.
///
/// # Implementation Notes
///
/// - `observe_snapshots` is push-based: it yields the currently cached list
///   and then a new snapshot whenever the underlying data changes.
/// - `fetch_snapshot` performs a one-shot refresh from the remote side. A
///   successful refresh is expected to make `observe_snapshots` re-emit.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Streams snapshots as the cached list changes.
    fn observe_snapshots(&self) -> BoxStream<'static, ConversationSnapshot>;

    /// Refreshes the list from the remote side.
    ///
    /// # Errors
    ///
    /// Returns [`crate::feed::error::SourceError`] when the network or the
    /// local cache fails.
    async fn fetch_snapshot(&self) -> SourceResult<ConversationSnapshot>;
}
