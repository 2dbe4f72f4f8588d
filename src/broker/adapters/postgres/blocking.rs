//! Blocking operation helpers for the `PostgreSQL` adapters.
//!
//! Diesel connections are synchronous, so each repository call checks a
//! connection out of the pool and runs on tokio's blocking thread pool.
//! The connection returns to the pool when the closure finishes, whether it
//! succeeded or failed.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use tokio::task::JoinError;

/// `PostgreSQL` connection pool type shared by broker adapters.
pub type BrokerPgPool = Pool<ConnectionManager<PgConnection>>;

/// Runs `f` with a pooled connection on the blocking thread pool.
///
/// `pool_err` and `join_err` map infrastructure failures into the caller's
/// error type.
pub(super) async fn with_connection<F, T, E>(
    pool: &BrokerPgPool,
    f: F,
    pool_err: fn(PoolError) -> E,
    join_err: fn(JoinError) -> E,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(pool_err)?;
        f(&mut connection)
    })
    .await
    .map_err(join_err)?
}
