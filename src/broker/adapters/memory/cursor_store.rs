//! In-memory receiver cursor store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::broker::{
    domain::{ChannelName, ReceiverCursor, ReceiverId},
    ports::{CursorStoreError, CursorStoreResult, ReceiverCursorRepository},
};

type CursorKey = (ReceiverId, ChannelName);

/// Thread-safe in-memory cursor store keyed by (receiver, channel).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCursorStore {
    cursors: Arc<RwLock<HashMap<CursorKey, ReceiverCursor>>>,
}

impl InMemoryCursorStore {
    /// Creates an empty cursor store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored cursors.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no cursors are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReceiverCursorRepository for InMemoryCursorStore {
    async fn find(
        &self,
        receiver_id: &ReceiverId,
        channel: &ChannelName,
    ) -> CursorStoreResult<Option<ReceiverCursor>> {
        let guard = self.cursors.read().map_err(|err| {
            CursorStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(guard
            .get(&(receiver_id.clone(), channel.clone()))
            .cloned())
    }

    async fn upsert(&self, cursor: &ReceiverCursor) -> CursorStoreResult<ReceiverCursor> {
        let mut guard = self.cursors.write().map_err(|err| {
            CursorStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let key = (cursor.receiver_id().clone(), cursor.channel().clone());
        guard.insert(key, cursor.clone());
        Ok(cursor.clone())
    }
}
