//! Port contracts for the message broker.
//!
//! Ports define infrastructure-agnostic interfaces used by broker services.

pub mod cursor_store;
pub mod message_log;

pub use cursor_store::{CursorStoreError, CursorStoreResult, ReceiverCursorRepository};
pub use message_log::{MessageLogError, MessageLogRepository, MessageLogResult};
