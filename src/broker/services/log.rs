//! Append and read operations over the message log.

use super::error::{BrokerError, BrokerResult};
use crate::broker::{
    domain::{ChannelName, FetchLimit, Message, MessageId, MessageIndex, Payload},
    ports::{MessageLogError, MessageLogRepository},
};
use mockable::Clock;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Number of append attempts made before a conflict is surfaced.
pub const DEFAULT_APPEND_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(attempts) => attempts,
    None => NonZeroU32::MIN,
};

/// One writer slot per channel with an append in flight.
///
/// Appends to the same channel queue on the channel's slot, so within one
/// process the "read max, add one, insert" sequence never interleaves.
/// Appends to different channels proceed in parallel. A slot is removed when
/// its last append releases it, so the map only holds busy channels.
#[derive(Debug, Clone, Default)]
struct ChannelWriters {
    slots: Arc<Mutex<HashMap<ChannelName, Arc<AsyncMutex<()>>>>>,
}

impl ChannelWriters {
    fn slot(&self, channel: &ChannelName) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(channel.clone()).or_default())
    }

    /// Drops `slot` and forgets the channel when no other append holds it.
    ///
    /// Must be called after the slot's lock guard is dropped. Handles are only
    /// cloned under the map lock, so the count cannot grow during the check.
    fn release(&self, channel: &ChannelName, slot: Arc<AsyncMutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = slots
            .get(channel)
            .is_some_and(|held| Arc::ptr_eq(held, &slot) && Arc::strong_count(&slot) == 2);
        drop(slot);
        if idle {
            slots.remove(channel);
        }
    }

    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Channel-scoped append and range-read operations.
///
/// Index assignment reads the channel's current maximum and inserts at the
/// next index. Writers in this process are serialised per channel; writers
/// in other processes are caught by the repository's uniqueness check, in
/// which case the append recomputes the index and tries again, up to the
/// configured number of attempts.
pub struct MessageLog<R, C>
where
    R: MessageLogRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    writers: ChannelWriters,
    append_attempts: NonZeroU32,
}

impl<R, C> Clone for MessageLog<R, C>
where
    R: MessageLogRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            writers: self.writers.clone(),
            append_attempts: self.append_attempts,
        }
    }
}

impl<R, C> MessageLog<R, C>
where
    R: MessageLogRepository,
    C: Clock + Send + Sync,
{
    /// Creates a message log over `repository`, stamping messages with `clock`.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            writers: ChannelWriters::default(),
            append_attempts: DEFAULT_APPEND_ATTEMPTS,
        }
    }

    /// Sets how many times an append is attempted when it loses an index race.
    ///
    /// With a single attempt, the first conflict is returned to the caller.
    #[must_use]
    pub fn with_append_attempts(self, append_attempts: NonZeroU32) -> Self {
        Self {
            append_attempts,
            ..self
        }
    }

    /// Returns the configured number of append attempts.
    #[must_use]
    pub const fn append_attempts(&self) -> NonZeroU32 {
        self.append_attempts
    }

    /// Appends `payload` to `channel` at the next free index.
    ///
    /// The first message of a channel receives index `0`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Conflict`] when every attempt lost the index to
    /// a concurrent writer, or a storage error when the repository fails.
    pub async fn append(&self, channel: &ChannelName, payload: Payload) -> BrokerResult<Message> {
        let slot = self.writers.slot(channel);
        let result = {
            let _writer = slot.lock().await;
            self.append_exclusive(channel, payload).await
        };
        self.writers.release(channel, slot);
        result
    }

    /// Returns the number of channels with an append in flight.
    #[must_use]
    pub fn active_writers(&self) -> usize {
        self.writers.len()
    }

    async fn append_exclusive(
        &self,
        channel: &ChannelName,
        payload: Payload,
    ) -> BrokerResult<Message> {
        let mut attempt: u32 = 1;
        loop {
            let index = self.next_index(channel).await?;
            let message = Message::new(channel.clone(), index, payload.clone(), &*self.clock);

            match self.repository.store(&message).await {
                Ok(()) => {
                    info!(
                        channel = %channel,
                        index = %index,
                        message_id = %message.id(),
                        "appended message"
                    );
                    return Ok(message);
                }
                Err(MessageLogError::IndexConflict {
                    channel: conflicted,
                    index: taken,
                }) => {
                    if attempt >= self.append_attempts.get() {
                        warn!(
                            channel = %conflicted,
                            index = %taken,
                            attempts = attempt,
                            "append conflict not resolved"
                        );
                        return Err(BrokerError::Conflict {
                            channel: conflicted,
                            index: taken,
                            attempts: attempt,
                        });
                    }
                    warn!(
                        channel = %conflicted,
                        index = %taken,
                        attempt,
                        "index claimed by a concurrent writer, retrying"
                    );
                    attempt = attempt.saturating_add(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns up to `limit` messages of `channel` starting at `start`,
    /// ordered by index.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the repository fails.
    pub async fn read_from(
        &self,
        channel: &ChannelName,
        start: MessageIndex,
        limit: FetchLimit,
    ) -> BrokerResult<Vec<Message>> {
        let messages = self.repository.read_from(channel, start, limit).await?;
        debug!(
            channel = %channel,
            start = %start,
            limit = %limit,
            returned = messages.len(),
            "read message range"
        );
        Ok(messages)
    }

    /// Looks up a message of `channel` by identifier.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the repository fails.
    pub async fn get_by_id(
        &self,
        channel: &ChannelName,
        id: MessageId,
    ) -> BrokerResult<Option<Message>> {
        Ok(self.repository.find_by_id(channel, id).await?)
    }

    /// Looks up a message of `channel` by identifier text.
    ///
    /// Text that does not parse as a message identifier cannot name a stored
    /// message, so it yields `None` without touching the repository.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the repository fails.
    pub async fn get_by_raw_id(
        &self,
        channel: &ChannelName,
        raw_id: &str,
    ) -> BrokerResult<Option<Message>> {
        match raw_id.parse::<MessageId>() {
            Ok(id) => self.get_by_id(channel, id).await,
            Err(_) => {
                debug!(channel = %channel, raw_id, "lookup id is not a message identifier");
                Ok(None)
            }
        }
    }

    async fn next_index(&self, channel: &ChannelName) -> BrokerResult<MessageIndex> {
        match self.repository.max_index(channel).await? {
            Some(last) => Ok(last.next()?),
            None => Ok(MessageIndex::FIRST),
        }
    }
}
