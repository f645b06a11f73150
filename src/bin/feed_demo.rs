//! Runs a scripted session against the in-memory adapters.
//!
//! Usage:
//!
//! ```text
//! CHATFEED_CONFIG=feed.json RUST_LOG=chatfeed=debug feed_demo
//! ```
//!
//! `CHATFEED_CONFIG` optionally names a JSON [`FeedConfig`] file, for
//! example:
//!
//! ```json
//! { "reorder": "most_recent_first", "unknown_update": "refresh" }
//! ```
//!
//! The demo signs a user in, lets the feed load, pushes a live preview,
//! sends a chat message through the loopback socket, and signs out again.
//! Progress is reported through `tracing`.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chatfeed::chat::{
    adapters::memory::{InMemoryChatSocket, RecordingNotificationSink},
    error::ChatError,
    services::ChatRoom,
};
use chatfeed::feed::{
    adapters::memory::{InMemoryConversationStore, InMemorySession, StaticHeadlineSource},
    config::{ConfigError, FeedConfig},
    domain::{ContentUpdate, Conversation, ConversationId, FeedState, UserId},
    services::{FeedReconciler, HeadlineService, SessionFeedController},
};
use chatfeed::telemetry::{TelemetryError, init_tracing};
use futures::StreamExt;
use mockable::DefaultClock;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

const CONFIG_ENV: &str = "CHATFEED_CONFIG";
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    run().await.map_err(Into::into)
}

async fn run() -> Result<(), DemoError> {
    init_tracing("info")?;
    let config = load_config()?;
    info!(?config, "starting feed demo");

    let store = Arc::new(InMemoryConversationStore::new());
    store.set_remote(vec![
        Conversation::new(ConversationId::new(1), "Ada").with_content("see you at noon"),
        Conversation::new(ConversationId::new(2), "Grace").with_unread_count(2),
        Conversation::new(ConversationId::new(3), "Linus").with_pinned(true),
    ]);
    let session = Arc::new(InMemorySession::new());
    let reconciler = FeedReconciler::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(DefaultClock),
        config,
    );
    let controller = SessionFeedController::new(reconciler, Arc::clone(&session));
    let mut states = controller.subscribe();
    let feed_task = controller.spawn();

    let headline = HeadlineService::new(Arc::new(StaticHeadlineSource::new("Stay curious")));
    let title = headline.drawer_title().filter_map(futures::future::ready).next().await;
    info!(title = title.as_deref().unwrap_or_default(), "drawer title");

    let user = UserId::new(42);
    session.sign_in(user);
    let loaded = wait_for(&mut states, "initial feed", |s| s.len() == 3 && !s.is_loading()).await?;
    info!(ids = ?loaded.ids(), "feed loaded");

    let first = ConversationId::new(1);
    tokio::time::timeout(STEP_TIMEOUT, async {
        while store.content_subscribers(first) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| DemoError::Timeout("content listener"))?;
    store.push_content(ContentUpdate::new(first, "running late"));
    let updated = wait_for(&mut states, "live preview", |s| {
        s.get(first).is_some_and(|entry| entry.content == "running late")
    })
    .await?;
    info!(ids = ?updated.ids(), "feed reordered");

    let room = ChatRoom::new(
        Arc::new(InMemoryChatSocket::new(Arc::new(DefaultClock))),
        Arc::new(RecordingNotificationSink::new()),
        Arc::new(DefaultClock),
    );
    room.connect(user, first).await?;
    room.set_draft("on my way");
    let sent = room.send().await?;
    let mut chat = room.subscribe();
    tokio::time::timeout(STEP_TIMEOUT, chat.wait_for(|s| !s.messages().is_empty()))
        .await
        .map_err(|_| DemoError::Timeout("chat echo"))?
        .map_err(|_| DemoError::Timeout("chat echo"))?;
    info!(id = ?sent, "chat message delivered");
    room.disconnect().await?;

    session.sign_out();
    feed_task.cancel();
    info!(conversations = controller.store().current().len(), "feed demo finished");
    Ok(())
}

fn load_config() -> Result<FeedConfig, ConfigError> {
    match env::var_os(CONFIG_ENV) {
        Some(path) => FeedConfig::load(path),
        None => Ok(FeedConfig::default()),
    }
}

async fn wait_for<F>(
    states: &mut watch::Receiver<FeedState>,
    step: &'static str,
    predicate: F,
) -> Result<FeedState, DemoError>
where
    F: FnMut(&FeedState) -> bool,
{
    let state = tokio::time::timeout(STEP_TIMEOUT, states.wait_for(predicate))
        .await
        .map_err(|_| DemoError::Timeout(step))?
        .map_err(|_| DemoError::Timeout(step))?;
    Ok(FeedState::clone(&state))
}
