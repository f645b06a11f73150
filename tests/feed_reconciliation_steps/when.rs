//! When steps for feed reconciliation BDD scenarios.

use super::world::{FeedWorld, run_async, wait_for_state, wait_until};
use chatfeed::feed::domain::{ContentUpdate, ConversationId};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the feed starts")]
fn feed_starts(world: &mut FeedWorld) -> Result<(), eyre::Report> {
    let mut states = world.start();
    let expected = world.store.cached_snapshot();
    let store = world.store.clone();
    run_async(async move {
        wait_for_state(&mut states, |s| s.len() == expected.len())
            .await
            .wrap_err("feed did not load the cached conversations")?;
        for id in expected.ids() {
            wait_until(|| store.content_subscribers(id) >= 1)
                .await
                .wrap_err_with(|| format!("no content listener for conversation {id}"))?;
        }
        Ok::<(), eyre::Report>(())
    })
}

#[when(r#"conversation {id:u64} receives content "{content}""#)]
fn conversation_receives_content(
    world: &mut FeedWorld,
    id: u64,
    content: String,
) -> Result<(), eyre::Report> {
    let conversation_id = ConversationId::new(id);
    let reached = world
        .store
        .push_content(ContentUpdate::new(conversation_id, content.clone()));
    let mut states = world.states()?;
    let known = states.borrow().get(conversation_id).is_some();
    run_async(async move {
        if reached > 0 && known {
            wait_for_state(&mut states, |s| {
                s.get(conversation_id)
                    .is_some_and(|entry| entry.content == content)
            })
            .await
            .wrap_err("content update was not merged")?;
        } else {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        Ok::<(), eyre::Report>(())
    })
}

#[when("the user signs out")]
fn user_signs_out(world: &mut FeedWorld) -> Result<(), eyre::Report> {
    world.session.sign_out();
    let store = world.store.clone();
    let ids: Vec<_> = world.store.cached_snapshot().ids().collect();
    run_async(async move {
        for id in ids {
            wait_until(|| store.content_subscribers(id) == 0)
                .await
                .wrap_err_with(|| format!("content listener for {id} survived sign-out"))?;
        }
        Ok::<(), eyre::Report>(())
    })
}
