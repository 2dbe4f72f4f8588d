//! Identifier and validated scalar types for the broker domain.

use super::BrokerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a published message.
///
/// # Examples
///
/// ```
/// use cursorlog::broker::domain::MessageId;
///
/// let id = MessageId::new();
/// assert!(!id.as_ref().is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a message identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for MessageId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = BrokerDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| BrokerDomainError::InvalidMessageId(value.to_owned()))
    }
}

/// Zero-based position of a message within its channel.
///
/// Indices are gapless per channel: the first message is `0`, the next `1`,
/// and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageIndex(u64);

impl MessageIndex {
    /// Index assigned to the first message of a channel.
    pub const FIRST: Self = Self(0);

    /// Largest index representable in the `BIGINT` storage column.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Wraps a raw index value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the index that follows this one.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::IndexOverflow`] when the successor would
    /// not fit the storage column.
    pub const fn next(self) -> Result<Self, BrokerDomainError> {
        if self.0 >= Self::MAX_PERSISTED_VALUE {
            return Err(BrokerDomainError::IndexOverflow);
        }
        Ok(Self(self.0 + 1))
    }
}

impl fmt::Display for MessageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of an independently ordered message stream.
///
/// Channel names are 3 to 100 characters drawn from ASCII letters, digits,
/// underscores and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Shortest accepted channel name.
    pub const MIN_LENGTH: usize = 3;
    /// Longest accepted channel name.
    pub const MAX_LENGTH: usize = 100;

    /// Creates a validated channel name.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::InvalidChannelLength`] when the name is
    /// outside the accepted length range, or
    /// [`BrokerDomainError::InvalidChannelCharacters`] when it contains
    /// anything other than letters, digits, `_` or `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cursorlog::broker::domain::ChannelName;
    ///
    /// assert!(ChannelName::new("room-123_").is_ok());
    /// assert!(ChannelName::new("invalid channel!").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, BrokerDomainError> {
        let raw = value.into();
        let length = raw.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(BrokerDomainError::InvalidChannelLength { length });
        }

        let is_valid = raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !is_valid {
            return Err(BrokerDomainError::InvalidChannelCharacters(raw));
        }

        Ok(Self(raw))
    }

    /// Returns the channel name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = BrokerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

/// Caller-supplied identity of a consumer.
///
/// Distinct receiver identifiers keep fully independent cursors, even on the
/// same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiverId(String);

impl ReceiverId {
    /// Longest accepted receiver identifier.
    pub const MAX_LENGTH: usize = 255;

    /// Creates a validated receiver identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::InvalidReceiverId`] when the value is
    /// blank or longer than [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BrokerDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() || raw.chars().count() > Self::MAX_LENGTH {
            return Err(BrokerDomainError::InvalidReceiverId(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the receiver identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ReceiverId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReceiverId {
    type Error = BrokerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReceiverId> for String {
    fn from(value: ReceiverId) -> Self {
        value.0
    }
}

/// Upper bound on the number of messages returned by a single read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchLimit(u32);

impl FetchLimit {
    /// Effectively unlimited read size.
    pub const UNBOUNDED: Self = Self(u32::MAX);

    /// Creates a positive fetch limit.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::InvalidFetchLimit`] when `value` is zero.
    pub const fn new(value: u32) -> Result<Self, BrokerDomainError> {
        if value == 0 {
            return Err(BrokerDomainError::InvalidFetchLimit { value, max: u32::MAX });
        }
        Ok(Self(value))
    }

    /// Creates a fetch limit no larger than `max`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::InvalidFetchLimit`] when `value` is zero
    /// or exceeds `max`.
    pub const fn bounded(value: u32, max: u32) -> Result<Self, BrokerDomainError> {
        if value == 0 || value > max {
            return Err(BrokerDomainError::InvalidFetchLimit { value, max });
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the limit as a collection length.
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for FetchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
