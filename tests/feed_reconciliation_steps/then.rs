//! Then steps for feed reconciliation BDD scenarios.

use super::world::{FeedWorld, parse_ids, run_async, wait_for_state, wait_until};
use chatfeed::feed::domain::ConversationId;
use rstest_bdd_macros::then;

#[then(r#"the feed lists "{ids}""#)]
fn feed_lists(world: &FeedWorld, ids: String) -> Result<(), eyre::Report> {
    let expected = parse_ids(&ids)?;
    let actual = world.states()?.borrow().ids();
    if actual != expected {
        return Err(eyre::eyre!("expected ids {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"conversation {id:u64} shows "{content}""#)]
fn conversation_shows(world: &FeedWorld, id: u64, content: String) -> Result<(), eyre::Report> {
    let states = world.states()?;
    let state = states.borrow();
    let entry = state
        .get(ConversationId::new(id))
        .ok_or_else(|| eyre::eyre!("conversation {id} is not in the feed"))?;
    if entry.content != content {
        return Err(eyre::eyre!(
            "expected content {content:?}, found {:?}",
            entry.content
        ));
    }
    Ok(())
}

#[then("the feed is not loading")]
fn feed_not_loading(world: &FeedWorld) -> Result<(), eyre::Report> {
    let mut states = world.states()?;
    let store = world.store.clone();
    run_async(async move {
        wait_until(|| store.fetch_count() >= 1).await?;
        wait_for_state(&mut states, |s| !s.is_loading()).await?;
        Ok::<(), eyre::Report>(())
    })
}
