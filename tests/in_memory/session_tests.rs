//! Session-gated feed behaviour through the public API.

use std::sync::Arc;

use chatfeed::feed::{
    adapters::memory::{InMemoryConversationStore, InMemorySession},
    config::FeedConfig,
    domain::{ContentUpdate, ConversationId, UserId},
    ports::SessionSignal,
    services::SessionFeedController,
};
use futures::stream::{self, BoxStream, StreamExt};
use rstest::rstest;

use super::helpers::{
    controller, conversations, ids, reconciler, session, settle, store, wait_for_state,
    wait_until,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn session_end_stops_publication_mid_stream(
    store: InMemoryConversationStore,
    session: InMemorySession,
) {
    store.publish_snapshot(conversations(&[(1, "A"), (2, "B")]));
    let controller = controller(&store, &session, FeedConfig::default().with_fetch_on_start(false));
    let _task = controller.spawn();
    let mut states = controller.subscribe();

    session.sign_in(UserId::new(7));
    wait_for_state(&mut states, |s| s.len() == 2).await;
    wait_until(|| store.content_subscribers(ConversationId::new(2)) == 1).await;
    store.push_content(ContentUpdate::new(ConversationId::new(1), "before"));
    let before = wait_for_state(&mut states, |s| s.ids() == ids(&[2, 1])).await;

    session.sign_out();
    wait_until(|| store.content_subscribers(ConversationId::new(2)) == 0).await;
    store.push_content(ContentUpdate::new(ConversationId::new(2), "after"));
    store.publish_snapshot(conversations(&[(9, "Z")]));
    settle().await;

    assert_eq!(controller.store().current(), before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn switching_users_restarts_the_feed(
    store: InMemoryConversationStore,
    session: InMemorySession,
) {
    store.set_remote(conversations(&[(1, "A")]));
    let controller = controller(&store, &session, FeedConfig::default());
    let _task = controller.spawn();
    let mut states = controller.subscribe();

    session.sign_in(UserId::new(1));
    wait_for_state(&mut states, |s| s.len() == 1 && !s.is_loading()).await;
    wait_until(|| store.fetch_count() == 1).await;

    store.set_remote(conversations(&[(1, "A"), (2, "B")]));
    session.sign_in(UserId::new(2));

    let state = wait_for_state(&mut states, |s| s.len() == 2).await;
    assert_eq!(state.ids(), ids(&[1, 2]));
    assert_eq!(store.fetch_count(), 2);
}

/// Session signal that replays a fixed script and then ends.
struct ScriptedSession {
    script: Vec<Option<UserId>>,
}

impl SessionSignal for ScriptedSession {
    fn observe_current_session(&self) -> BoxStream<'static, Option<UserId>> {
        stream::iter(self.script.clone()).boxed()
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ending_the_session_signal_stops_the_controller(store: InMemoryConversationStore) {
    store.publish_snapshot(conversations(&[(1, "A")]));
    let session = ScriptedSession {
        script: vec![Some(UserId::new(3))],
    };
    let controller = SessionFeedController::new(
        reconciler(&store, FeedConfig::default().with_fetch_on_start(false)),
        Arc::new(session),
    );

    let task = controller.spawn();

    wait_until(|| task.is_finished()).await;
    wait_until(|| store.content_subscribers(ConversationId::new(1)) == 0).await;
}
