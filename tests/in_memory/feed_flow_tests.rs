//! End-to-end feed reconciliation through the public API.

use chatfeed::feed::{
    adapters::memory::InMemoryConversationStore,
    config::FeedConfig,
    domain::{ContentUpdate, ConversationId, ReorderPolicy},
    error::SourceError,
};
use futures::StreamExt;
use rstest::rstest;

use super::helpers::{
    conversations, ids, reconciler, settle, store, wait_for_state, wait_until,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn snapshot_then_update_reorders_feed(store: InMemoryConversationStore) {
    store.set_remote(conversations(&[(1, "A"), (2, "B")]));
    let feed = reconciler(&store, FeedConfig::default()).observe_feed();
    let mut states = feed.store().subscribe();

    let loaded = wait_for_state(&mut states, |s| s.len() == 2 && !s.is_loading()).await;
    assert_eq!(loaded.ids(), ids(&[1, 2]));

    wait_until(|| store.content_subscribers(ConversationId::new(1)) == 1).await;
    store.push_content(ContentUpdate::new(ConversationId::new(1), "hi"));

    let updated = wait_for_state(&mut states, |s| s.ids() == ids(&[2, 1])).await;
    let entry = updated.get(ConversationId::new(1)).expect("entry 1");
    assert_eq!(entry.content, "hi");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_for_unknown_conversation_is_dropped(store: InMemoryConversationStore) {
    store.publish_snapshot(conversations(&[(1, "A"), (2, "B")]));
    let feed = reconciler(&store, FeedConfig::default().with_fetch_on_start(false)).observe_feed();
    let mut states = feed.store().subscribe();
    let before = wait_for_state(&mut states, |s| s.len() == 2).await;

    store.push_content(ContentUpdate::new(ConversationId::new(99), "x"));
    settle().await;

    assert_eq!(feed.current(), before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn most_recent_first_policy_moves_updates_to_front(store: InMemoryConversationStore) {
    store.publish_snapshot(conversations(&[(1, "A"), (2, "B"), (3, "C")]));
    let config = FeedConfig::default()
        .with_fetch_on_start(false)
        .with_reorder(ReorderPolicy::MostRecentFirst);
    let feed = reconciler(&store, config).observe_feed();
    let mut states = feed.store().subscribe();
    wait_for_state(&mut states, |s| s.len() == 3).await;
    wait_until(|| store.content_subscribers(ConversationId::new(3)) == 1).await;

    store.push_content(ContentUpdate::new(ConversationId::new(3), "newest"));

    wait_for_state(&mut states, |s| s.ids() == ids(&[3, 1, 2])).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_fetch_keeps_cached_conversations(store: InMemoryConversationStore) {
    store.publish_snapshot(conversations(&[(1, "A"), (2, "B")]));
    store.fail_next_fetch(SourceError::unavailable("offline"));
    let reconciler = reconciler(&store, FeedConfig::default());

    let lifecycle: Vec<_> = reconciler.fetch_conversations().collect().await;
    assert!(lifecycle.last().is_some_and(|r| r.failure_ref().is_some()));

    store.fail_next_fetch(SourceError::unavailable("still offline"));
    let feed = reconciler.observe_feed();
    let mut states = feed.store().subscribe();
    wait_until(|| store.fetch_count() == 2).await;
    let state = wait_for_state(&mut states, |s| s.len() == 2 && !s.is_loading()).await;
    assert_eq!(state.ids(), ids(&[1, 2]));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn feed_stream_stays_open_after_loading(store: InMemoryConversationStore) {
    store.publish_snapshot(conversations(&[(4, "D")]));
    let mut feed =
        reconciler(&store, FeedConfig::default().with_fetch_on_start(false)).observe_feed();

    let latest = tokio::time::timeout(super::helpers::WAIT, async {
        loop {
            match feed.next().await {
                Some(state) if state.len() == 1 => break state,
                Some(_) => {}
                None => panic!("feed stream must not end"),
            }
        }
    })
    .await
    .expect("feed should load in time");

    assert_eq!(latest.ids(), ids(&[4]));
    assert!(!feed.is_finished());
}
