//! Per-receiver read positions.

use super::{ChannelName, MessageIndex, ReceiverId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Highest index delivered to a receiver on one channel.
///
/// A cursor with no `last_read_index` means nothing has been delivered yet;
/// reading resumes from [`MessageIndex::FIRST`] in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverCursor {
    receiver_id: ReceiverId,
    channel: ChannelName,
    last_read_index: Option<MessageIndex>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCursorData {
    /// Stored receiver identifier.
    pub receiver_id: ReceiverId,
    /// Stored channel.
    pub channel: ChannelName,
    /// Stored last delivered index, if any.
    pub last_read_index: Option<MessageIndex>,
    /// Stored update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ReceiverCursor {
    /// Creates a cursor positioned at `last_read_index`.
    #[must_use]
    pub fn delivered_through(
        receiver_id: ReceiverId,
        channel: ChannelName,
        last_read_index: MessageIndex,
        clock: &impl Clock,
    ) -> Self {
        Self {
            receiver_id,
            channel,
            last_read_index: Some(last_read_index),
            updated_at: clock.utc(),
        }
    }

    /// Reconstructs a cursor from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCursorData) -> Self {
        Self {
            receiver_id: data.receiver_id,
            channel: data.channel,
            last_read_index: data.last_read_index,
            updated_at: data.updated_at,
        }
    }

    /// Returns the receiver that owns the cursor.
    #[must_use]
    pub const fn receiver_id(&self) -> &ReceiverId {
        &self.receiver_id
    }

    /// Returns the channel the cursor tracks.
    #[must_use]
    pub const fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Returns the last delivered index, or `None` when nothing was delivered.
    #[must_use]
    pub const fn last_read_index(&self) -> Option<MessageIndex> {
        self.last_read_index
    }

    /// Returns when the cursor was last written.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the first index not yet delivered.
    #[must_use]
    pub fn next_index(&self) -> MessageIndex {
        self.last_read_index.map_or(MessageIndex::FIRST, |last| {
            MessageIndex::new(last.value().saturating_add(1))
        })
    }
}

/// Resolves where a cursor-based read starts for an optional cursor.
#[must_use]
pub fn resume_index(cursor: Option<&ReceiverCursor>) -> MessageIndex {
    cursor.map_or(MessageIndex::FIRST, ReceiverCursor::next_index)
}
