//! Storage rule tests for [`InMemoryMessageLog`].

use crate::in_memory::helpers::{TestResult, channel, clock, indices, log, message_at, runtime};
use cursorlog::broker::{
    adapters::memory::InMemoryMessageLog,
    domain::{ChannelName, FetchLimit, MessageIndex},
    ports::{MessageLogError, MessageLogRepository},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
fn second_store_at_same_index_is_a_conflict(
    runtime: io::Result<Runtime>,
    log: InMemoryMessageLog,
    clock: DefaultClock,
    channel: ChannelName,
) -> TestResult {
    let rt = runtime?;
    let winner = message_at(&channel, 0, &clock);
    let loser = message_at(&channel, 0, &clock);

    rt.block_on(log.store(&winner))?;
    let result = rt.block_on(log.store(&loser));

    assert!(matches!(
        result,
        Err(MessageLogError::IndexConflict { index, .. }) if index == MessageIndex::FIRST
    ));
    assert_eq!(log.len(), 1);
    Ok(())
}

#[rstest]
fn storing_the_same_message_twice_is_a_duplicate(
    runtime: io::Result<Runtime>,
    log: InMemoryMessageLog,
    clock: DefaultClock,
    channel: ChannelName,
) -> TestResult {
    let rt = runtime?;
    let message = message_at(&channel, 0, &clock);

    rt.block_on(log.store(&message))?;
    let result = rt.block_on(log.store(&message));

    assert!(matches!(
        result,
        Err(MessageLogError::DuplicateMessage(id)) if id == message.id()
    ));
    Ok(())
}

#[rstest]
fn max_index_tracks_highest_stored_index(
    runtime: io::Result<Runtime>,
    log: InMemoryMessageLog,
    clock: DefaultClock,
    channel: ChannelName,
) -> TestResult {
    let rt = runtime?;
    assert_eq!(rt.block_on(log.max_index(&channel))?, None);

    for index in 0..3 {
        rt.block_on(log.store(&message_at(&channel, index, &clock)))?;
    }

    assert_eq!(
        rt.block_on(log.max_index(&channel))?,
        Some(MessageIndex::new(2))
    );
    Ok(())
}

#[rstest]
fn read_from_returns_ascending_window(
    runtime: io::Result<Runtime>,
    log: InMemoryMessageLog,
    clock: DefaultClock,
    channel: ChannelName,
) -> TestResult {
    let rt = runtime?;
    for index in [2, 0, 4, 1, 3] {
        rt.block_on(log.store(&message_at(&channel, index, &clock)))?;
    }

    let window = rt.block_on(log.read_from(&channel, MessageIndex::new(1), FetchLimit::new(3)?))?;
    let everything =
        rt.block_on(log.read_from(&channel, MessageIndex::FIRST, FetchLimit::UNBOUNDED))?;

    assert_eq!(indices(&window), vec![1, 2, 3]);
    assert_eq!(indices(&everything), vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[rstest]
fn find_by_id_ignores_other_channels(
    runtime: io::Result<Runtime>,
    log: InMemoryMessageLog,
    clock: DefaultClock,
    channel: ChannelName,
) -> TestResult {
    let rt = runtime?;
    let other = ChannelName::new("chan2")?;
    let message = message_at(&channel, 0, &clock);
    rt.block_on(log.store(&message))?;

    assert_eq!(
        rt.block_on(log.find_by_id(&channel, message.id()))?,
        Some(message.clone())
    );
    assert_eq!(rt.block_on(log.find_by_id(&other, message.id()))?, None);
    Ok(())
}
