//! Publish and fetch flows through [`BrokerService`] backed by memory.
//!
//! [`BrokerService`]: cursorlog::broker::services::BrokerService

use crate::in_memory::helpers::{MemoryBroker, broker, channel, indices, numbered};
use cursorlog::broker::domain::{ChannelName, FetchLimit, MessageIndex, ReceiverId};
use rstest::rstest;

async fn publish_count(broker: &MemoryBroker, channel: &ChannelName, count: u64) -> eyre::Result<()> {
    for n in 0..count {
        broker.publish(channel, numbered(n)).await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn single_consumer_sees_every_message_exactly_once(
    broker: MemoryBroker,
    channel: ChannelName,
) -> eyre::Result<()> {
    let receiver = ReceiverId::new("r1")?;
    let mut seen = Vec::new();

    for round in 0..4_u64 {
        publish_count(&broker, &channel, round + 1).await?;
        let batch = broker
            .fetch_new_for_receiver(&receiver, &channel, FetchLimit::new(2)?)
            .await?;
        seen.extend(batch);
    }
    loop {
        let batch = broker
            .fetch_new_for_receiver(&receiver, &channel, FetchLimit::new(2)?)
            .await?;
        if batch.is_empty() {
            break;
        }
        seen.extend(batch);
    }

    assert_eq!(indices(&seen), (0..10).collect::<Vec<u64>>());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cursor_reflects_last_delivered_index(
    broker: MemoryBroker,
    channel: ChannelName,
) -> eyre::Result<()> {
    let receiver = ReceiverId::new("r1")?;
    publish_count(&broker, &channel, 5).await?;

    broker
        .fetch_new_for_receiver(&receiver, &channel, FetchLimit::new(3)?)
        .await?;
    let cursor = broker
        .receiver_cursor(&receiver, &channel)
        .await?
        .ok_or_else(|| eyre::eyre!("cursor should exist after delivery"))?;

    assert_eq!(cursor.last_read_index(), Some(MessageIndex::new(2)));
    assert_eq!(cursor.next_index(), MessageIndex::new(3));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn range_reads_do_not_affect_receivers(
    broker: MemoryBroker,
    channel: ChannelName,
) -> eyre::Result<()> {
    let receiver = ReceiverId::new("r1")?;
    publish_count(&broker, &channel, 3).await?;

    for _ in 0..3 {
        let window = broker
            .fetch_from_index(&channel, MessageIndex::FIRST, FetchLimit::UNBOUNDED)
            .await?;
        assert_eq!(indices(&window), vec![0, 1, 2]);
    }

    assert!(broker.receiver_cursor(&receiver, &channel).await?.is_none());
    Ok(())
}
