//! Application services for publishing and consuming messages.

mod error;
mod log;
mod query;

pub use error::{BrokerError, BrokerErrorKind, BrokerResult};
pub use log::{DEFAULT_APPEND_ATTEMPTS, MessageLog};
pub use query::BrokerService;
