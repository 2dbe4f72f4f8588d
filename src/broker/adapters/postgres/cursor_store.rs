//! `PostgreSQL` receiver cursor store.

use super::{
    blocking::{BrokerPgPool, with_connection},
    models::ReceiverRow,
    schema::receivers,
};
use crate::broker::{
    domain::{ChannelName, MessageIndex, PersistedCursorData, ReceiverCursor, ReceiverId},
    ports::{CursorStoreError, CursorStoreResult, ReceiverCursorRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;

/// Column value standing for "nothing delivered yet".
const NOTHING_READ: i64 = -1;

/// `PostgreSQL`-backed cursor store.
///
/// Upserts use `INSERT ... ON CONFLICT DO UPDATE`, so creating and advancing
/// a cursor is a single atomic statement.
#[derive(Debug, Clone)]
pub struct PostgresCursorStore {
    pool: BrokerPgPool,
}

impl PostgresCursorStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BrokerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CursorStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CursorStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        with_connection(
            &self.pool,
            f,
            CursorStoreError::persistence,
            CursorStoreError::persistence,
        )
        .await
    }
}

#[async_trait]
impl ReceiverCursorRepository for PostgresCursorStore {
    async fn find(
        &self,
        receiver_id: &ReceiverId,
        channel: &ChannelName,
    ) -> CursorStoreResult<Option<ReceiverCursor>> {
        let lookup_receiver = receiver_id.as_str().to_owned();
        let lookup_channel = channel.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = receivers::table
                .filter(receivers::receiver_id.eq(lookup_receiver))
                .filter(receivers::channel.eq(lookup_channel))
                .select(ReceiverRow::as_select())
                .first::<ReceiverRow>(connection)
                .optional()
                .map_err(CursorStoreError::persistence)?;
            row.map(row_to_cursor).transpose()
        })
        .await
    }

    async fn upsert(&self, cursor: &ReceiverCursor) -> CursorStoreResult<ReceiverCursor> {
        let row = to_row(cursor)?;
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(receivers::table)
                .values(&row)
                .on_conflict((receivers::receiver_id, receivers::channel))
                .do_update()
                .set((
                    receivers::last_read_index.eq(excluded(receivers::last_read_index)),
                    receivers::updated_at.eq(excluded(receivers::updated_at)),
                ))
                .returning(ReceiverRow::as_returning())
                .get_result::<ReceiverRow>(connection)
                .map_err(CursorStoreError::persistence)?;
            row_to_cursor(stored)
        })
        .await
    }
}

fn to_row(cursor: &ReceiverCursor) -> CursorStoreResult<ReceiverRow> {
    let last_read_index = match cursor.last_read_index() {
        Some(index) => i64::try_from(index.value()).map_err(CursorStoreError::persistence)?,
        None => NOTHING_READ,
    };

    Ok(ReceiverRow {
        receiver_id: cursor.receiver_id().as_str().to_owned(),
        channel: cursor.channel().as_str().to_owned(),
        last_read_index,
        updated_at: cursor.updated_at(),
    })
}

fn row_to_cursor(row: ReceiverRow) -> CursorStoreResult<ReceiverCursor> {
    let ReceiverRow {
        receiver_id,
        channel,
        last_read_index,
        updated_at,
    } = row;

    // Negative values other than the sentinel are rejected by a CHECK
    // constraint, so any negative value reads as "nothing delivered".
    let last_read = u64::try_from(last_read_index).ok().map(MessageIndex::new);

    let data = PersistedCursorData {
        receiver_id: ReceiverId::new(receiver_id).map_err(CursorStoreError::persistence)?,
        channel: ChannelName::new(channel).map_err(CursorStoreError::persistence)?,
        last_read_index: last_read,
        updated_at,
    };
    Ok(ReceiverCursor::from_persisted(data))
}
