//! Diesel schema for broker persistence.

diesel::table! {
    /// Append-only message log.
    messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Channel the message belongs to.
        #[max_length = 100]
        channel -> Varchar,
        /// Zero-based index within the channel.
        message_index -> Int8,
        /// Structured payload.
        payload -> Jsonb,
        /// Append timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Receiver read cursors, one per (receiver, channel).
    receivers (receiver_id, channel) {
        /// Caller-supplied receiver identifier.
        #[max_length = 255]
        receiver_id -> Varchar,
        /// Tracked channel.
        #[max_length = 100]
        channel -> Varchar,
        /// Last delivered index, `-1` when nothing was delivered.
        last_read_index -> Int8,
        /// Last cursor write.
        updated_at -> Timestamptz,
    }
}
