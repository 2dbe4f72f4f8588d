//! Caller-facing broker operations.

use super::{error::BrokerResult, log::MessageLog};
use crate::broker::{
    domain::{
        ChannelName, FetchLimit, Message, MessageId, MessageIndex, Payload, ReceiverCursor,
        ReceiverId, resume_index,
    },
    ports::{MessageLogRepository, ReceiverCursorRepository},
};
use crate::config::{BrokerConfig, ConfigError, FetchConfig};
use mockable::Clock;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, info};

/// Publish, fetch and lookup operations combining the message log with
/// receiver cursors.
pub struct BrokerService<L, K, C>
where
    L: MessageLogRepository,
    K: ReceiverCursorRepository,
    C: Clock + Send + Sync,
{
    log: MessageLog<L, C>,
    cursors: Arc<K>,
    clock: Arc<C>,
    fetch: FetchConfig,
}

impl<L, K, C> Clone for BrokerService<L, K, C>
where
    L: MessageLogRepository,
    K: ReceiverCursorRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            log: self.log.clone(),
            cursors: Arc::clone(&self.cursors),
            clock: Arc::clone(&self.clock),
            fetch: self.fetch,
        }
    }
}

impl<L, K, C> BrokerService<L, K, C>
where
    L: MessageLogRepository,
    K: ReceiverCursorRepository,
    C: Clock + Send + Sync,
{
    /// Creates a broker service from its storage and clock dependencies.
    #[must_use]
    pub fn new(messages: Arc<L>, cursors: Arc<K>, clock: Arc<C>) -> Self {
        Self {
            log: MessageLog::new(messages, Arc::clone(&clock)),
            cursors,
            clock,
            fetch: FetchConfig::default(),
        }
    }

    /// Creates a broker service using the append and fetch policies of
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `config` fails validation.
    pub fn from_config(
        messages: Arc<L>,
        cursors: Arc<K>,
        clock: Arc<C>,
        config: &BrokerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let service = Self::new(messages, cursors, clock)
            .with_append_attempts(config.append_attempts()?);
        Ok(Self {
            fetch: config.fetch,
            ..service
        })
    }

    /// Sets how many times a publish is attempted when it loses an index race.
    #[must_use]
    pub fn with_append_attempts(self, append_attempts: NonZeroU32) -> Self {
        Self {
            log: self.log.with_append_attempts(append_attempts),
            ..self
        }
    }

    /// Resolves a caller-supplied fetch limit against the configured default
    /// and maximum.
    ///
    /// # Errors
    ///
    /// Returns [`super::BrokerError::Domain`] for `0` or a value above the
    /// maximum.
    pub fn fetch_limit(&self, requested: Option<u32>) -> BrokerResult<FetchLimit> {
        Ok(self.fetch.resolve(requested)?)
    }

    /// Returns the underlying message log.
    #[must_use]
    pub const fn log(&self) -> &MessageLog<L, C> {
        &self.log
    }

    /// Appends `payload` to `channel` and returns the stored message.
    ///
    /// # Errors
    ///
    /// Returns [`super::BrokerError::Conflict`] when concurrent writers kept
    /// claiming the index, or a storage error.
    pub async fn publish(&self, channel: &ChannelName, payload: Payload) -> BrokerResult<Message> {
        self.log.append(channel, payload).await
    }

    /// Returns up to `limit` messages of `channel` with index `>= from`.
    ///
    /// No receiver state is read or written, so repeated calls return the
    /// same messages as long as nothing is appended in the range.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the read fails.
    pub async fn fetch_from_index(
        &self,
        channel: &ChannelName,
        from: MessageIndex,
        limit: FetchLimit,
    ) -> BrokerResult<Vec<Message>> {
        self.log.read_from(channel, from, limit).await
    }

    /// Returns the next messages of `channel` that `receiver` has not been
    /// given yet, and advances its cursor past them.
    ///
    /// An empty result leaves the cursor untouched.
    ///
    /// # Errors
    ///
    /// Returns a storage error when reading messages or writing the cursor
    /// fails. If the cursor write fails after the read, the messages are not
    /// considered delivered and the next call returns them again.
    pub async fn fetch_new_for_receiver(
        &self,
        receiver: &ReceiverId,
        channel: &ChannelName,
        limit: FetchLimit,
    ) -> BrokerResult<Vec<Message>> {
        let cursor = self.cursors.find(receiver, channel).await?;
        let start = resume_index(cursor.as_ref());
        let messages = self.log.read_from(channel, start, limit).await?;

        let Some(last) = messages.last() else {
            debug!(
                receiver = %receiver,
                channel = %channel,
                start = %start,
                "no new messages for receiver"
            );
            return Ok(messages);
        };

        let advanced = ReceiverCursor::delivered_through(
            receiver.clone(),
            channel.clone(),
            last.index(),
            &*self.clock,
        );
        self.cursors.upsert(&advanced).await?;
        info!(
            receiver = %receiver,
            channel = %channel,
            from = %start,
            through = %last.index(),
            delivered = messages.len(),
            "advanced receiver cursor"
        );
        Ok(messages)
    }

    /// Looks up a message of `channel` by identifier.
    ///
    /// Messages of other channels are not visible through this lookup.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn get_by_id(
        &self,
        channel: &ChannelName,
        id: MessageId,
    ) -> BrokerResult<Option<Message>> {
        self.log.get_by_id(channel, id).await
    }

    /// Looks up a message of `channel` by identifier text, as received from a
    /// caller.
    ///
    /// Text that is not a valid identifier is reported as absent rather than
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn get_by_id_str(
        &self,
        channel: &ChannelName,
        raw_id: &str,
    ) -> BrokerResult<Option<Message>> {
        self.log.get_by_raw_id(channel, raw_id).await
    }

    /// Returns the stored cursor of `receiver` on `channel`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn receiver_cursor(
        &self,
        receiver: &ReceiverId,
        channel: &ChannelName,
    ) -> BrokerResult<Option<ReceiverCursor>> {
        Ok(self.cursors.find(receiver, channel).await?)
    }
}
