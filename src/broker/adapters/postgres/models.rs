//! Diesel row models for broker persistence.

use super::schema::{messages, receivers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for messages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Channel name.
    pub channel: String,
    /// Channel index.
    pub message_index: i64,
    /// JSON payload.
    pub payload: Value,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Channel name.
    pub channel: String,
    /// Channel index.
    pub message_index: i64,
    /// JSON payload.
    pub payload: Value,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and upsert row for receiver cursors.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = receivers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReceiverRow {
    /// Receiver identifier.
    pub receiver_id: String,
    /// Channel name.
    pub channel: String,
    /// Last delivered index, `-1` for none.
    pub last_read_index: i64,
    /// Last cursor write.
    pub updated_at: DateTime<Utc>,
}
