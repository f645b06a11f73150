//! Given steps for feed reconciliation BDD scenarios.

use super::world::{FeedWorld, parse_conversations};
use chatfeed::feed::{domain::UserId, error::SourceError};
use rstest_bdd_macros::given;

#[given(r#"the cached conversations "{list}""#)]
fn cached_conversations(world: &mut FeedWorld, list: String) -> Result<(), eyre::Report> {
    let conversations = parse_conversations(&list)?;
    world.store.publish_snapshot(conversations.clone());
    world.store.set_remote(conversations);
    Ok(())
}

#[given(r#"the next fetch fails with "{reason}""#)]
fn next_fetch_fails(world: &mut FeedWorld, reason: String) {
    world.store.fail_next_fetch(SourceError::unavailable(reason));
}

#[given("the feed fetches on start")]
fn feed_fetches_on_start(world: &mut FeedWorld) {
    world.config = world.config.clone().with_fetch_on_start(true);
}

#[given("user {user:u64} is signed in")]
fn user_signed_in(world: &mut FeedWorld, user: u64) {
    world.session.sign_in(UserId::new(user));
}
