//! Service-level error type for broker operations.

use crate::broker::{
    domain::{BrokerDomainError, ChannelName, MessageIndex},
    ports::{CursorStoreError, MessageLogError},
};
use thiserror::Error;

/// Service-level errors for broker operations.
///
/// "Not found" is never an error: lookups return `Option`.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// Concurrent writers kept claiming the computed index until the append
    /// ran out of attempts.
    #[error(
        "index {index} in channel {channel} was claimed by a concurrent writer after {attempts} attempt(s)"
    )]
    Conflict {
        /// Channel being appended to.
        channel: ChannelName,
        /// Index the final attempt tried to claim.
        index: MessageIndex,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Domain invariant violated while building a message.
    #[error(transparent)]
    Domain(#[from] BrokerDomainError),

    /// Message log operation failed.
    #[error(transparent)]
    Log(#[from] MessageLogError),

    /// Cursor store operation failed.
    #[error(transparent)]
    Cursor(#[from] CursorStoreError),
}

/// Coarse classification of a [`BrokerError`] for callers deciding whether to
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerErrorKind {
    /// The append lost a race; publishing again may succeed.
    Conflict,
    /// A domain rule refused the operation, such as a channel whose index
    /// space is exhausted. Retrying gives the same answer.
    Rejected,
    /// The operation failed and retrying will not help without intervention.
    Storage,
}

impl BrokerError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> BrokerErrorKind {
        match self {
            Self::Conflict { .. } | Self::Log(MessageLogError::IndexConflict { .. }) => {
                BrokerErrorKind::Conflict
            }
            Self::Domain(_) => BrokerErrorKind::Rejected,
            Self::Log(_) | Self::Cursor(_) => BrokerErrorKind::Storage,
        }
    }

    /// Returns `true` when the error reports a lost append race.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.kind(), BrokerErrorKind::Conflict)
    }
}

/// Result type for broker service operations.
pub type BrokerResult<T> = Result<T, BrokerError>;
