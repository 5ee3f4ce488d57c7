/// Credential model and database operations
///
/// One credential per user, stored in the `passwords` table. The username is
/// duplicated here so authentication can find a credential by username without
/// joining `users`. Only [`User::register`](crate::models::user::User::register)
/// and [`User::change_username`](crate::models::user::User::change_username)
/// write that column, inside the same transaction as the `users` row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE passwords (
///     user_id INTEGER PRIMARY KEY REFERENCES users (user_id) ON DELETE CASCADE,
///     username VARCHAR(255) UNIQUE NOT NULL,
///     password VARCHAR(255) NOT NULL
/// );
/// ```

use crate::constraint::translate;
use crate::error::{StoreError, StoreResult};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

/// Credential record
///
/// The password is opaque to the store and is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Credential {
    pub user_id: i32,
    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,
}

impl Credential {
    /// Inserts the credential for a freshly inserted user
    pub(crate) async fn insert(
        conn: &mut PgConnection,
        user_id: i32,
        username: &str,
        password: &str,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO passwords (user_id, username, password)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(password)
        .execute(conn)
        .await
        .map_err(|e| translate("insert credential", e))?;

        Ok(())
    }

    /// Copies a new username onto the user's credential
    pub(crate) async fn rename(
        conn: &mut PgConnection,
        user_id: i32,
        username: &str,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE passwords SET username = $1 WHERE user_id = $2")
            .bind(username)
            .bind(user_id)
            .execute(conn)
            .await
            .map_err(|e| translate("update credential username", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "credential",
                id: user_id,
            });
        }

        Ok(())
    }

    /// Finds the credential for a username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, username, password
            FROM passwords
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load credential", e))
    }

    /// Finds the credential for a user ID
    pub async fn find_by_user_id(pool: &PgPool, user_id: i32) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, username, password
            FROM passwords
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load credential", e))
    }

    /// Replaces a user's password
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user has no credential
    pub async fn update_password(pool: &PgPool, user_id: i32, password: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE passwords SET password = $1 WHERE user_id = $2")
            .bind(password)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| translate("update password", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "credential",
                id: user_id,
            });
        }

        Ok(())
    }
}
