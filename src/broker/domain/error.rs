//! Error types for broker domain validation.

use thiserror::Error;

/// Errors returned while constructing broker domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerDomainError {
    /// The channel name length is outside the accepted range.
    #[error("channel name must be between 3 and 100 characters, got {length}")]
    InvalidChannelLength {
        /// Length of the rejected name in characters.
        length: usize,
    },

    /// The channel name contains characters outside the accepted set.
    #[error("channel name may only contain letters, numbers, underscores, and hyphens: '{0}'")]
    InvalidChannelCharacters(String),

    /// The receiver identifier is blank or too long.
    #[error("invalid receiver identifier '{0}'")]
    InvalidReceiverId(String),

    /// The message identifier is not a valid UUID.
    #[error("invalid message identifier '{0}'")]
    InvalidMessageId(String),

    /// The payload is not a JSON object.
    #[error("payload must be a JSON object")]
    PayloadNotObject,

    /// The payload object has no keys.
    #[error("payload must not be empty")]
    EmptyPayload,

    /// The requested fetch limit is zero or above the permitted maximum.
    #[error("fetch limit {value} is invalid, expected 1..={max}")]
    InvalidFetchLimit {
        /// Requested limit.
        value: u32,
        /// Largest permitted limit.
        max: u32,
    },

    /// The channel has no index left to assign.
    #[error("message index space exhausted")]
    IndexOverflow,
}
