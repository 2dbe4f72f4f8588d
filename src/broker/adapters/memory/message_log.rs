//! In-memory message log.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::broker::{
    domain::{ChannelName, FetchLimit, Message, MessageId, MessageIndex},
    ports::{MessageLogError, MessageLogRepository, MessageLogResult},
};

/// Thread-safe in-memory message log.
///
/// Enforces the same uniqueness rules as the `PostgreSQL` schema: one
/// message per identifier and one message per (channel, index).
///
/// # Example
///
/// ```
/// use cursorlog::broker::adapters::memory::InMemoryMessageLog;
///
/// let log = InMemoryMessageLog::new();
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageLog {
    state: Arc<RwLock<InMemoryLogState>>,
}

#[derive(Debug, Default)]
struct InMemoryLogState {
    messages: HashMap<MessageId, Message>,
    channels: HashMap<ChannelName, BTreeMap<MessageIndex, MessageId>>,
}

impl InMemoryMessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored messages across all channels.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .map(|state| state.messages.len())
            .unwrap_or(0)
    }

    /// Returns `true` if no messages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(err: impl ToString) -> MessageLogError {
    MessageLogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MessageLogRepository for InMemoryMessageLog {
    async fn store(&self, message: &Message) -> MessageLogResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.messages.contains_key(&message.id()) {
            return Err(MessageLogError::DuplicateMessage(message.id()));
        }

        let entries = state.channels.entry(message.channel().clone()).or_default();
        if entries.contains_key(&message.index()) {
            return Err(MessageLogError::IndexConflict {
                channel: message.channel().clone(),
                index: message.index(),
            });
        }

        entries.insert(message.index(), message.id());
        state.messages.insert(message.id(), message.clone());
        Ok(())
    }

    async fn max_index(&self, channel: &ChannelName) -> MessageLogResult<Option<MessageIndex>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .channels
            .get(channel)
            .and_then(|entries| entries.keys().next_back().copied()))
    }

    async fn read_from(
        &self,
        channel: &ChannelName,
        start: MessageIndex,
        limit: FetchLimit,
    ) -> MessageLogResult<Vec<Message>> {
        let state = self.state.read().map_err(lock_error)?;
        let Some(entries) = state.channels.get(channel) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .range(start..)
            .take(limit.as_usize())
            .filter_map(|(_, id)| state.messages.get(id).cloned())
            .collect())
    }

    async fn find_by_id(
        &self,
        channel: &ChannelName,
        id: MessageId,
    ) -> MessageLogResult<Option<Message>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .messages
            .get(&id)
            .filter(|message| message.channel() == channel)
            .cloned())
    }
}
