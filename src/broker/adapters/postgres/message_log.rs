//! `PostgreSQL` message log.

use super::{
    blocking::{BrokerPgPool, with_connection},
    models::{MessageRow, NewMessageRow},
    schema::messages,
};
use crate::broker::{
    domain::{
        ChannelName, FetchLimit, Message, MessageId, MessageIndex, Payload, PersistedMessageData,
    },
    ports::{MessageLogError, MessageLogRepository, MessageLogResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Name of the unique constraint over `(channel, message_index)`.
const CHANNEL_INDEX_CONSTRAINT: &str = "messages_channel_index_unique";

/// `PostgreSQL`-backed message log.
///
/// Index uniqueness is enforced by the `messages_channel_index_unique`
/// constraint, so a losing concurrent insert surfaces as
/// [`MessageLogError::IndexConflict`] rather than a generic failure.
///
/// # Example
///
/// ```ignore
/// use diesel::r2d2::{ConnectionManager, Pool};
/// use diesel::PgConnection;
/// use cursorlog::broker::adapters::postgres::PostgresMessageLog;
///
/// let manager = ConnectionManager::<PgConnection>::new("postgres://...");
/// let pool = Pool::builder().build(manager).expect("pool");
/// let log = PostgresMessageLog::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresMessageLog {
    pool: BrokerPgPool,
}

impl PostgresMessageLog {
    /// Creates a new log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BrokerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MessageLogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MessageLogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        with_connection(
            &self.pool,
            f,
            MessageLogError::persistence,
            MessageLogError::persistence,
        )
        .await
    }
}

#[async_trait]
impl MessageLogRepository for PostgresMessageLog {
    async fn store(&self, message: &Message) -> MessageLogResult<()> {
        let new_row = to_new_row(message)?;
        let message_id = message.id();
        let channel = message.channel().clone();
        let index = message.index();

        self.run_blocking(move |connection| {
            diesel::insert_into(messages::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, message_id, channel, index))?;
            Ok(())
        })
        .await
    }

    async fn max_index(&self, channel: &ChannelName) -> MessageLogResult<Option<MessageIndex>> {
        let lookup_channel = channel.as_str().to_owned();
        self.run_blocking(move |connection| {
            let max: Option<i64> = messages::table
                .filter(messages::channel.eq(lookup_channel))
                .select(diesel::dsl::max(messages::message_index))
                .first(connection)
                .map_err(MessageLogError::persistence)?;
            max.map(index_from_column).transpose()
        })
        .await
    }

    async fn read_from(
        &self,
        channel: &ChannelName,
        start: MessageIndex,
        limit: FetchLimit,
    ) -> MessageLogResult<Vec<Message>> {
        // An index past the BIGINT range cannot exist, so nothing follows it.
        let Ok(start_index) = i64::try_from(start.value()) else {
            return Ok(Vec::new());
        };
        let lookup_channel = channel.as_str().to_owned();
        let row_limit = i64::from(limit.value());

        let rows = self
            .run_blocking(move |connection| {
                messages::table
                    .filter(messages::channel.eq(lookup_channel))
                    .filter(messages::message_index.ge(start_index))
                    .order(messages::message_index.asc())
                    .limit(row_limit)
                    .select(MessageRow::as_select())
                    .load::<MessageRow>(connection)
                    .map_err(MessageLogError::persistence)
            })
            .await?;
        debug!(channel = %channel, start = %start, rows = rows.len(), "loaded message range");

        rows.into_iter().map(row_to_message).collect()
    }

    async fn find_by_id(
        &self,
        channel: &ChannelName,
        id: MessageId,
    ) -> MessageLogResult<Option<Message>> {
        let lookup_channel = channel.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = messages::table
                .filter(messages::id.eq(id.into_inner()))
                .filter(messages::channel.eq(lookup_channel))
                .select(MessageRow::as_select())
                .first::<MessageRow>(connection)
                .optional()
                .map_err(MessageLogError::persistence)?;
            row.map(row_to_message).transpose()
        })
        .await
    }
}

fn to_new_row(message: &Message) -> MessageLogResult<NewMessageRow> {
    let message_index =
        i64::try_from(message.index().value()).map_err(MessageLogError::persistence)?;

    Ok(NewMessageRow {
        id: message.id().into_inner(),
        channel: message.channel().as_str().to_owned(),
        message_index,
        payload: message.payload().clone().into_value(),
        created_at: message.created_at(),
    })
}

fn row_to_message(row: MessageRow) -> MessageLogResult<Message> {
    let MessageRow {
        id,
        channel,
        message_index,
        payload,
        created_at,
    } = row;

    let data = PersistedMessageData {
        id: MessageId::from_uuid(id),
        channel: ChannelName::new(channel).map_err(MessageLogError::persistence)?,
        index: index_from_column(message_index)?,
        payload: Payload::try_from(payload).map_err(MessageLogError::persistence)?,
        created_at,
    };
    Ok(Message::from_persisted(data))
}

fn index_from_column(value: i64) -> MessageLogResult<MessageIndex> {
    u64::try_from(value)
        .map(MessageIndex::new)
        .map_err(MessageLogError::persistence)
}

/// Maps a failed insert onto a semantic error when a known unique
/// constraint was violated.
fn map_insert_error(
    err: DieselError,
    message_id: MessageId,
    channel: ChannelName,
    index: MessageIndex,
) -> MessageLogError {
    let constraint = match &err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name().map(str::to_owned)
        }
        _ => None,
    };

    match constraint.as_deref() {
        Some(CHANNEL_INDEX_CONSTRAINT) => MessageLogError::IndexConflict { channel, index },
        Some("messages_pkey") => MessageLogError::DuplicateMessage(message_id),
        _ => MessageLogError::persistence(err),
    }
}
