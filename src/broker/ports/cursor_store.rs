//! Repository port for receiver read cursors.

use crate::broker::domain::{ChannelName, ReceiverCursor, ReceiverId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for cursor repository operations.
pub type CursorStoreResult<T> = Result<T, CursorStoreError>;

/// Receiver cursor persistence contract.
#[async_trait]
pub trait ReceiverCursorRepository: Send + Sync {
    /// Finds the cursor of `receiver_id` on `channel`.
    ///
    /// Returns `None` when the receiver has never consumed from the channel.
    async fn find(
        &self,
        receiver_id: &ReceiverId,
        channel: &ChannelName,
    ) -> CursorStoreResult<Option<ReceiverCursor>>;

    /// Creates or overwrites the cursor for its (receiver, channel) pair and
    /// returns the stored state.
    ///
    /// The write is unconditional; callers are responsible for only moving
    /// cursors forward.
    ///
    /// # Errors
    ///
    /// Returns [`CursorStoreError::Persistence`] when storage fails.
    async fn upsert(&self, cursor: &ReceiverCursor) -> CursorStoreResult<ReceiverCursor>;
}

/// Errors returned by cursor repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CursorStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CursorStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
