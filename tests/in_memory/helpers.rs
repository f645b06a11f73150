//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use chatfeed::feed::{
    adapters::memory::{InMemoryConversationStore, InMemorySession},
    config::FeedConfig,
    domain::{Conversation, ConversationId, FeedState},
    services::{FeedReconciler, SessionFeedController},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::sync::watch;

/// Upper bound for any single wait.
pub const WAIT: Duration = Duration::from_secs(5);

/// Reconciler wired to one in-memory store.
pub type TestReconciler =
    FeedReconciler<InMemoryConversationStore, InMemoryConversationStore, DefaultClock>;

/// Controller wired to in-memory adapters.
pub type TestController = SessionFeedController<
    InMemoryConversationStore,
    InMemoryConversationStore,
    DefaultClock,
    InMemorySession,
>;

/// Provides a fresh in-memory conversation store for each test.
#[fixture]
pub fn store() -> InMemoryConversationStore {
    InMemoryConversationStore::new()
}

/// Provides a session with nobody signed in.
#[fixture]
pub fn session() -> InMemorySession {
    InMemorySession::new()
}

/// Builds a reconciler over `store`.
pub fn reconciler(store: &InMemoryConversationStore, config: FeedConfig) -> TestReconciler {
    FeedReconciler::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        config,
    )
}

/// Builds a session controller over `store` and `session`.
pub fn controller(
    store: &InMemoryConversationStore,
    session: &InMemorySession,
    config: FeedConfig,
) -> TestController {
    SessionFeedController::new(reconciler(store, config), Arc::new(session.clone()))
}

/// Named conversations with the given ids.
pub fn conversations(entries: &[(u64, &str)]) -> Vec<Conversation> {
    entries
        .iter()
        .map(|(id, name)| Conversation::new(ConversationId::new(*id), *name))
        .collect()
}

/// Converts raw ids into conversation ids.
pub fn ids(raw: &[u64]) -> Vec<ConversationId> {
    raw.iter().copied().map(ConversationId::new).collect()
}

/// Waits until the observed state satisfies `predicate`.
pub async fn wait_for_state<F>(receiver: &mut watch::Receiver<FeedState>, predicate: F) -> FeedState
where
    F: FnMut(&FeedState) -> bool,
{
    let state = tokio::time::timeout(WAIT, receiver.wait_for(predicate))
        .await
        .expect("feed state should settle in time")
        .expect("feed store should stay alive");
    FeedState::clone(&state)
}

/// Polls `condition` until it holds.
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition should hold in time");
}

/// Gives spawned tasks a chance to run when asserting that nothing happens.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
