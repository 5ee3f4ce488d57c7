/// Error types for the persistence layer
///
/// Every repository operation returns [`StoreResult`]. Failures fall into
/// three groups:
///
/// - **Infrastructure**: [`StoreError::Connection`], [`StoreError::UnreachableStore`],
///   [`StoreError::TimedOut`]. The store is unavailable; callers decide whether to retry.
/// - **Conflicts**: [`StoreError::UsernameTaken`], [`StoreError::EmailTaken`]. The
///   caller sent a value that collides with an existing row and can correct it.
/// - **Everything else**: [`StoreError::Write`], [`StoreError::Read`],
///   [`StoreError::NotFound`] and the bootstrap errors.
///
/// `Write` and `Read` keep the original `sqlx::Error` as their source for
/// diagnostics, but their `Display` output names only the operation.

use std::time::Duration;

/// Result alias used throughout the store
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The pool could not hand out a connection in time, or the connection broke
    #[error("database connection unavailable")]
    Connection(#[source] sqlx::Error),

    /// The store could not be reached when the pool was created
    #[error("database is unreachable")]
    UnreachableStore(#[source] sqlx::Error),

    /// An operation ran past the caller's deadline
    #[error("{operation} timed out after {timeout:?}")]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    /// The username belongs to another user
    #[error("username already exists")]
    UsernameTaken,

    /// The email belongs to another user
    #[error("email already exists")]
    EmailTaken,

    /// An update targeted a row that does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A write failed for a reason the constraint translator does not classify
    #[error("failed to {operation}")]
    Write {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A read failed
    #[error("failed to {operation}")]
    Read {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The target database name is not a plain identifier
    #[error("invalid database name: {0:?}")]
    InvalidDatabaseName(String),

    /// A schema statement failed for a reason other than "already exists"
    #[error("failed to bootstrap {object}")]
    Schema {
        object: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Classifies a failed read
    ///
    /// Pool and transport failures become [`StoreError::Connection`]; anything
    /// else is a [`StoreError::Read`] tagged with `operation`.
    pub fn read(operation: &'static str, err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            StoreError::Connection(err)
        } else {
            StoreError::Read {
                operation,
                source: err,
            }
        }
    }

    /// True for conflicts the caller can fix by choosing another value
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::UsernameTaken | StoreError::EmailTaken)
    }

    /// True when the store itself is unavailable
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Connection(_) | StoreError::UnreachableStore(_) | StoreError::TimedOut { .. }
        )
    }
}

/// Returns true when `err` means no usable connection was available
pub(crate) fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed
    )
}
