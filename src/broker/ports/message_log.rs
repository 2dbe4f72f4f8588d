//! Repository port for the append-only message log.

use crate::broker::domain::{ChannelName, FetchLimit, Message, MessageId, MessageIndex};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for message log repository operations.
pub type MessageLogResult<T> = Result<T, MessageLogError>;

/// Message log persistence contract.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - Message IDs are unique across the entire log
/// - Indices are unique within a channel, enforced atomically at insert time
/// - Messages are immutable after storage (no update operations)
#[async_trait]
pub trait MessageLogRepository: Send + Sync {
    /// Stores a new message in a single atomic insert.
    ///
    /// # Errors
    ///
    /// Returns [`MessageLogError::IndexConflict`] when the channel already
    /// holds a message at the same index, [`MessageLogError::DuplicateMessage`]
    /// when the identifier is taken, or [`MessageLogError::Persistence`] when
    /// storage fails.
    async fn store(&self, message: &Message) -> MessageLogResult<()>;

    /// Returns the highest index stored for `channel`.
    ///
    /// Returns `None` when the channel has no messages.
    async fn max_index(&self, channel: &ChannelName) -> MessageLogResult<Option<MessageIndex>>;

    /// Returns up to `limit` messages of `channel` with an index of at least
    /// `start`, ordered by index ascending.
    ///
    /// A `start` beyond the last index yields an empty vector.
    async fn read_from(
        &self,
        channel: &ChannelName,
        start: MessageIndex,
        limit: FetchLimit,
    ) -> MessageLogResult<Vec<Message>>;

    /// Finds a message by identifier within `channel`.
    ///
    /// Returns `None` when no such message exists in that channel.
    async fn find_by_id(
        &self,
        channel: &ChannelName,
        id: MessageId,
    ) -> MessageLogResult<Option<Message>>;
}

/// Errors returned by message log repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MessageLogError {
    /// A message with the same identifier already exists.
    #[error("duplicate message identifier: {0}")]
    DuplicateMessage(MessageId),

    /// The index was claimed by another writer before this insert committed.
    #[error("index {index} is already taken in channel {channel}")]
    IndexConflict {
        /// Channel holding the conflicting entry.
        channel: ChannelName,
        /// Index that was already taken.
        index: MessageIndex,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MessageLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
