//! Domain model for the message broker.
//!
//! Channels hold append-only, gapless sequences of [`Message`]s; receivers
//! track their progress through a channel with a [`ReceiverCursor`]. The
//! scalar types here are validated at construction, so any value reaching
//! the services is already well formed.

mod cursor;
mod error;
mod ids;
mod message;
mod payload;

pub use cursor::{PersistedCursorData, ReceiverCursor, resume_index};
pub use error::BrokerDomainError;
pub use ids::{ChannelName, FetchLimit, MessageId, MessageIndex, ReceiverId};
pub use message::{Message, PersistedMessageData};
pub use payload::Payload;
