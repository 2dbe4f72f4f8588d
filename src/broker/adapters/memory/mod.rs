//! In-memory adapter implementations.
//!
//! These adapters keep all state behind an `RwLock` and are suitable for
//! tests and single-process embedding. Nothing survives a restart.

mod cursor_store;
mod message_log;

pub use cursor_store::InMemoryCursorStore;
pub use message_log::InMemoryMessageLog;
