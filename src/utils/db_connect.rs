use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use eyre::{Error, Result};

/// Async Postgres connection pool
pub type DbPool = Pool<AsyncPgConnection>;
/// A connection checked out of [`DbPool`]
pub type DbConnection = Object<AsyncPgConnection>;

/// Builds the Postgres connection pool.
///
/// Connections are opened lazily, so an unreachable database surfaces on
/// the first query rather than here.
///
/// # Returns
/// * `Result<DbPool>` - The connection pool
///
/// # Errors
/// * If pool creation fails
pub fn build_pool(database_url: &str, max_size: usize) -> Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| Error::msg(format!("Failed to create connection pool: {e}")))
}
