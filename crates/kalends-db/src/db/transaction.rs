//! Reentrant transaction helper.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//! use kalends_db::db::transaction::with_transaction;
//!
//! with_transaction(conn, |conn| async move {
//!     entry::update(conn, cal_id, &row).await?;
//!     repeat::save_recurrence(conn, cal_id, &recurrence, policy).await?;
//!     Ok::<_, DbError>(())
//! }.scope_boxed()).await?;
//! ```
//!
//! Only the outermost call opens, commits and rolls back. Nested calls run
//! their closure inside the enclosing transaction and leave its outcome to
//! the caller that opened it.

use diesel::QueryResult;
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AnsiTransactionManager, AsyncConnection, TransactionManager};

use crate::db::connection::DbConnection;

/// ## Summary
/// Returns whether the connection is already inside a transaction.
///
/// ## Errors
/// Returns an error if the transaction manager is in a broken state after an
/// earlier failed commit or rollback.
pub fn in_transaction(conn: &mut DbConnection) -> QueryResult<bool> {
    let depth = AnsiTransactionManager::transaction_manager_status_mut(conn).transaction_depth()?;
    Ok(depth.is_some())
}

/// ## Summary
/// Runs `callback` atomically, joining an open transaction if there is one.
///
/// ## Errors
/// Returns the closure's error unchanged, or errors raised while starting,
/// committing or rolling back a transaction this call opened.
pub async fn with_transaction<'conn, T, E, F>(conn: &'conn mut DbConnection, callback: F) -> Result<T, E>
where
    F: for<'r> FnOnce(&'r mut DbConnection) -> ScopedBoxFuture<'conn, 'r, Result<T, E>>
        + Send
        + 'conn,
    E: From<diesel::result::Error> + Send + 'conn,
    T: Send + 'conn,
{
    if in_transaction(conn)? {
        tracing::trace!("Joining enclosing transaction");
        return callback(conn).await;
    }

    tracing::trace!("Opening transaction");
    conn.transaction(callback).await
}
