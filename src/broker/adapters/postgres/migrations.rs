//! Schema setup for the broker tables.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use tracing::info;

/// SQL creating the `messages` and `receivers` tables.
pub const CREATE_BROKER_TABLES_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_broker_tables/up.sql");

/// SQL dropping the broker tables.
pub const DROP_BROKER_TABLES_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_broker_tables/down.sql");

/// Applies the broker schema to the connected database.
///
/// Every statement is guarded by `IF NOT EXISTS`, so running this against an
/// already migrated database is a no-op.
///
/// # Errors
///
/// Returns the Diesel error raised by the first failing statement.
pub fn apply_migrations(connection: &mut PgConnection) -> Result<(), diesel::result::Error> {
    info!("applying broker schema");
    connection.batch_execute(CREATE_BROKER_TABLES_SQL)?;
    info!("broker schema is up to date");
    Ok(())
}
