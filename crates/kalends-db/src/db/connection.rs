use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type PooledDbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// Connection every query function runs on.
///
/// Pooled connections deref to it, so `&mut pooled` can be passed directly.
pub type DbConnection = AsyncPgConnection;

/// ## Summary
/// Creates a new database connection pool.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the provided database URL.
#[tracing::instrument(skip(database_url), fields(pool_size = size))]
pub async fn create_pool(database_url: &str, size: u32) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(size)
        .min_idle(Some(1))
        .test_on_check_out(false)
        .build(config)
        .await?;

    tracing::info!(
        pool_size = size,
        "Database connection pool created successfully"
    );

    Ok(pool)
}

/// ## Summary
/// Checks a connection out of the pool.
///
/// ## Errors
/// Returns `DbError::PoolError` if no connection becomes available.
#[tracing::instrument(skip(pool))]
pub async fn checkout(pool: &DbPool) -> DbResult<PooledDbConnection<'_>> {
    Ok(pool.get().await?)
}
