//! `PostgreSQL` adapters for broker persistence.
//!
//! Both repositories share one r2d2 pool type and offload Diesel calls to
//! tokio's blocking thread pool.

mod blocking;
mod cursor_store;
mod message_log;
mod migrations;
mod models;
mod schema;

pub use blocking::BrokerPgPool;
pub use cursor_store::PostgresCursorStore;
pub use message_log::PostgresMessageLog;
pub use migrations::{CREATE_BROKER_TABLES_SQL, DROP_BROKER_TABLES_SQL, apply_migrations};
