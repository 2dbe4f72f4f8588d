//! Immutable log entries.

use super::{ChannelName, MessageId, MessageIndex, Payload};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A payload appended to a channel at a fixed index.
///
/// Messages never change once written. Reads order them by
/// [`index`](Self::index); `created_at` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    channel: ChannelName,
    index: MessageIndex,
    payload: Payload,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessageData {
    /// Stored identifier.
    pub id: MessageId,
    /// Stored channel.
    pub channel: ChannelName,
    /// Stored channel index.
    pub index: MessageIndex,
    /// Stored payload.
    pub payload: Payload,
    /// Stored append timestamp.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with a fresh identifier, stamped by `clock`.
    #[must_use]
    pub fn new(
        channel: ChannelName,
        index: MessageIndex,
        payload: Payload,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: MessageId::new(),
            channel,
            index,
            payload,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a message from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMessageData) -> Self {
        Self {
            id: data.id,
            channel: data.channel,
            index: data.index,
            payload: data.payload,
            created_at: data.created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the channel the message belongs to.
    #[must_use]
    pub const fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Returns the position of the message within its channel.
    #[must_use]
    pub const fn index(&self) -> MessageIndex {
        self.index
    }

    /// Returns the message payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the append timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
