/// Transaction coordinator
///
/// Runs a group of dependent statements as one atomic unit. The closure gets a
/// connection inside an open transaction; if it returns `Ok` the transaction
/// commits, if it returns `Err` (or its future is dropped) everything rolls
/// back. Nothing is retried.
///
/// # Example
///
/// ```no_run
/// use habitforge_store::constraint::translate;
/// use habitforge_store::db::transaction::run_in_transaction;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> habitforge_store::StoreResult<()> {
/// let user_id = 7;
/// run_in_transaction(&pool, "reset counters", move |conn| {
///     Box::pin(async move {
///         sqlx::query("UPDATE habits SET good_count = 0, bad_count = 0 WHERE user_id = $1")
///             .bind(user_id)
///             .execute(&mut *conn)
///             .await
///             .map_err(|e| translate("reset habit counters", e))?;
///
///         sqlx::query("UPDATE dailies SET streak = 0 WHERE user_id = $1")
///             .bind(user_id)
///             .execute(&mut *conn)
///             .await
///             .map_err(|e| translate("reset daily streaks", e))?;
///
///         Ok(())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use crate::constraint::translate;
use crate::db::pool::begin;
use crate::error::StoreResult;
use futures::future::BoxFuture;
use sqlx::PgConnection;
use tracing::{debug, warn};

/// Runs `unit` inside a transaction and commits if it succeeds
///
/// # Errors
///
/// - `StoreError::Connection` if no connection is available or `BEGIN` fails
/// - whatever `unit` returns, after rolling back
/// - the translated driver error if `COMMIT` fails
pub async fn run_in_transaction<T, F>(
    pool: &sqlx::PgPool,
    operation: &'static str,
    unit: F,
) -> StoreResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, StoreResult<T>> + Send,
{
    let mut tx = begin(pool).await?;

    let outcome = unit(&mut *tx).await;

    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(|e| translate(operation, e))?;
            debug!(operation, "Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                // The connection is discarded by the pool; the server aborts the
                // transaction when it goes away.
                warn!(operation, error = %rollback_err, "Rollback failed");
            }
            debug!(operation, "Transaction rolled back");
            Err(err)
        }
    }
}
