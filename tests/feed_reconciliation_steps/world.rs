//! Shared world state for feed reconciliation BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use chatfeed::feed::{
    adapters::memory::{InMemoryConversationStore, InMemorySession},
    config::FeedConfig,
    domain::{Conversation, ConversationId, FeedState},
    services::{ControllerTask, FeedReconciler, SessionFeedController},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::sync::watch;

/// Controller type used by the BDD world.
pub type TestController = SessionFeedController<
    InMemoryConversationStore,
    InMemoryConversationStore,
    DefaultClock,
    InMemorySession,
>;

/// Upper bound for any single wait in a step.
pub const WAIT: Duration = Duration::from_secs(5);

/// Scenario world for feed reconciliation behaviour tests.
pub struct FeedWorld {
    pub store: InMemoryConversationStore,
    pub session: InMemorySession,
    pub config: FeedConfig,
    pub controller: Option<TestController>,
    pub task: Option<ControllerTask>,
}

impl FeedWorld {
    /// Creates a world with empty sources and no running feed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: InMemoryConversationStore::new(),
            session: InMemorySession::new(),
            config: FeedConfig::default().with_fetch_on_start(false),
            controller: None,
            task: None,
        }
    }

    /// Builds and spawns the session controller.
    pub fn start(&mut self) -> watch::Receiver<FeedState> {
        let reconciler = FeedReconciler::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(DefaultClock),
            self.config.clone(),
        );
        let controller = SessionFeedController::new(reconciler, Arc::new(self.session.clone()));
        let states = controller.subscribe();
        self.task = Some(controller.spawn());
        self.controller = Some(controller);
        states
    }

    /// Returns a receiver for the running feed.
    ///
    /// # Errors
    ///
    /// Returns an error when the feed has not been started.
    pub fn states(&self) -> Result<watch::Receiver<FeedState>, eyre::Report> {
        self.controller
            .as_ref()
            .map(TestController::subscribe)
            .ok_or_else(|| eyre::eyre!("feed has not been started in scenario world"))
    }
}

impl Default for FeedWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> FeedWorld {
    FeedWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses `"1:Ada,2:Grace"` into conversations.
///
/// # Errors
///
/// Returns an error when an entry is not `<id>:<name>`.
pub fn parse_conversations(list: &str) -> Result<Vec<Conversation>, eyre::Report> {
    list.split(',')
        .map(|entry| -> Result<Conversation, eyre::Report> {
            let (id, name) = entry
                .split_once(':')
                .ok_or_else(|| eyre::eyre!("expected <id>:<name>, got {entry:?}"))?;
            let id: u64 = id.trim().parse()?;
            Ok(Conversation::new(ConversationId::new(id), name.trim()))
        })
        .collect()
}

/// Parses `"2,1"` into conversation ids.
///
/// # Errors
///
/// Returns an error when an id is not a number.
pub fn parse_ids(list: &str) -> Result<Vec<ConversationId>, eyre::Report> {
    list.split(',')
        .map(|raw| -> Result<ConversationId, eyre::Report> {
            Ok(ConversationId::new(raw.trim().parse()?))
        })
        .collect()
}

/// Waits until the observed state satisfies `predicate`.
///
/// # Errors
///
/// Returns an error when the state does not settle in time.
pub async fn wait_for_state<F>(
    states: &mut watch::Receiver<FeedState>,
    predicate: F,
) -> Result<FeedState, eyre::Report>
where
    F: FnMut(&FeedState) -> bool,
{
    let state = tokio::time::timeout(WAIT, states.wait_for(predicate)).await??;
    Ok(FeedState::clone(&state))
}

/// Polls `condition` until it holds.
///
/// # Errors
///
/// Returns an error when the condition does not hold in time.
pub async fn wait_until<F>(mut condition: F) -> Result<(), eyre::Report>
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}
