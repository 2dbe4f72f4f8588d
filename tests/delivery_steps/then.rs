//! Then steps for message delivery BDD scenarios.

use super::world::{DeliveryWorld, channel, message_text, run_async};
use cursorlog::broker::{
    domain::{FetchLimit, MessageIndex, ReceiverId},
    ports::{MessageLogError, MessageLogRepository},
};
use rstest_bdd_macros::then;

#[then(r#"the message "{text}" has index {index:u64}"#)]
fn message_has_index(world: &DeliveryWorld, text: String, index: u64) -> Result<(), eyre::Report> {
    let message = world
        .published
        .iter()
        .find(|message| message_text(message) == Some(text.as_str()))
        .ok_or_else(|| eyre::eyre!("message {text:?} was not published"))?;
    eyre::ensure!(
        message.index() == MessageIndex::new(index),
        "expected {text:?} at index {index}, found {}",
        message.index()
    );
    Ok(())
}

#[then(r#"the fetched messages are "{texts}""#)]
fn fetched_texts(world: &DeliveryWorld, texts: String) -> Result<(), eyre::Report> {
    let fetched = world
        .last_fetch
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no fetch recorded in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("fetch failed: {err}"))?;
    let actual: Vec<&str> = fetched.iter().filter_map(message_text).collect();
    let expected: Vec<&str> = texts.split(',').collect();
    eyre::ensure!(
        actual == expected,
        "expected {expected:?}, fetched {actual:?}"
    );
    Ok(())
}

#[then("no messages are fetched")]
fn nothing_fetched(world: &DeliveryWorld) -> Result<(), eyre::Report> {
    let fetched = world
        .last_fetch
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no fetch recorded in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("fetch failed: {err}"))?;
    eyre::ensure!(fetched.is_empty(), "expected no messages, got {}", fetched.len());
    Ok(())
}

#[then(r#"receiver "{receiver}" has read channel "{name}" through index {index:u64}"#)]
fn receiver_read_through(
    world: &DeliveryWorld,
    receiver: String,
    name: String,
    index: u64,
) -> Result<(), eyre::Report> {
    let target = channel(&name)?;
    let receiver_id = ReceiverId::new(receiver)?;
    let cursor = run_async(world.broker.receiver_cursor(&receiver_id, &target))?
        .ok_or_else(|| eyre::eyre!("receiver has no cursor"))?;
    eyre::ensure!(
        cursor.last_read_index() == Some(MessageIndex::new(index)),
        "expected cursor at {index}, found {:?}",
        cursor.last_read_index()
    );
    Ok(())
}

#[then(r#"receiver "{receiver}" has no cursor on channel "{name}""#)]
fn receiver_has_no_cursor(
    world: &DeliveryWorld,
    receiver: String,
    name: String,
) -> Result<(), eyre::Report> {
    let target = channel(&name)?;
    let receiver_id = ReceiverId::new(receiver)?;
    let cursor = run_async(world.broker.receiver_cursor(&receiver_id, &target))?;
    eyre::ensure!(cursor.is_none(), "expected no cursor, found {cursor:?}");
    Ok(())
}

#[then("no message is found")]
fn no_message_found(world: &DeliveryWorld) -> Result<(), eyre::Report> {
    let lookup = world
        .last_lookup
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no lookup recorded in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("lookup failed: {err}"))?;
    eyre::ensure!(lookup.is_none(), "expected no message, found {lookup:?}");
    Ok(())
}

#[then("exactly one store succeeds")]
fn exactly_one_store_succeeds(world: &DeliveryWorld) -> Result<(), eyre::Report> {
    let successes = world.store_results.iter().filter(|result| result.is_ok()).count();
    eyre::ensure!(successes == 1, "expected one successful store, got {successes}");
    Ok(())
}

#[then("the other store fails with an index conflict")]
fn other_store_conflicts(world: &DeliveryWorld) -> Result<(), eyre::Report> {
    let conflicts = world
        .store_results
        .iter()
        .filter(|result| matches!(result, Err(MessageLogError::IndexConflict { .. })))
        .count();
    eyre::ensure!(conflicts == 1, "expected one index conflict, got {conflicts}");
    Ok(())
}

#[then(r#"channel "{name}" holds {count:usize} message"#)]
fn channel_holds(world: &DeliveryWorld, name: String, count: usize) -> Result<(), eyre::Report> {
    let target = channel(&name)?;
    let stored = run_async(world.log.read_from(&target, MessageIndex::FIRST, FetchLimit::UNBOUNDED))?;
    eyre::ensure!(
        stored.len() == count,
        "expected {count} stored message(s), found {}",
        stored.len()
    );
    Ok(())
}
