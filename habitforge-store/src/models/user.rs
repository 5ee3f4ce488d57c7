/// User model and database operations
///
/// Users are the root of the schema: every credential, habit, daily and task
/// belongs to exactly one user and is removed with it.
///
/// Registration and username changes touch both `users` and `passwords` and
/// run as single transactions, so a user never exists without its credential
/// and the two username copies never diverge.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id SERIAL PRIMARY KEY,
///     username VARCHAR(255) UNIQUE NOT NULL,
///     email VARCHAR(255) UNIQUE NOT NULL,
///     phone VARCHAR(20),
///     created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use habitforge_store::models::user::{RegisterUser, User};
/// use habitforge_store::StoreError;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let registration = RegisterUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     phone: None,
///     password: "opaque-secret".to_string(),
/// };
///
/// match User::register(&pool, registration).await {
///     Ok(user) => println!("Registered user {}", user.id),
///     Err(StoreError::UsernameTaken) => println!("Pick another username"),
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```

use crate::constraint::translate;
use crate::db::transaction::run_in_transaction;
use crate::error::{StoreError, StoreResult};
use crate::models::credential::Credential;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned user ID
    #[sqlx(rename = "user_id")]
    pub id: i32,

    /// Unique username, mirrored into the user's credential
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Set once at registration
    pub created_at: NaiveDateTime,
}

/// Input for registering a new user
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,

    /// Opaque secret stored in the credential row as given
    pub password: String,
}

impl User {
    /// Registers a user and their credential atomically
    ///
    /// Inserts the `users` row, then the `passwords` row for the generated ID.
    /// If either insert fails nothing is kept.
    ///
    /// # Errors
    ///
    /// - `StoreError::UsernameTaken` if the username exists in either table
    /// - `StoreError::EmailTaken` if the email exists
    /// - `StoreError::Connection` if no connection is available
    /// - `StoreError::Write` for any other failure
    pub async fn register(pool: &PgPool, data: RegisterUser) -> StoreResult<Self> {
        run_in_transaction(pool, "register user", move |conn| {
            Box::pin(async move {
                let user = sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, email, phone)
                    VALUES ($1, $2, $3)
                    RETURNING user_id, username, email, phone, created_at
                    "#,
                )
                .bind(&data.username)
                .bind(&data.email)
                .bind(&data.phone)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| translate("insert user", e))?;

                Credential::insert(&mut *conn, user.id, &data.username, &data.password).await?;

                Ok(user)
            })
        })
        .await
    }

    /// Finds a user by ID
    ///
    /// Returns `Ok(None)` if no such user exists.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, phone, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load user", e))
    }

    /// Finds a user by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, phone, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load user", e))
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, phone, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load user", e))
    }

    /// Renames a user in both `users` and `passwords`, atomically
    ///
    /// Concurrent renames of the same user serialize on the row lock taken by
    /// the first update.
    ///
    /// # Errors
    ///
    /// - `StoreError::UsernameTaken` if another user has `new_username`
    /// - `StoreError::NotFound` if the user or their credential does not exist
    /// - `StoreError::Write` for any other failure; neither row changes
    pub async fn change_username(pool: &PgPool, id: i32, new_username: String) -> StoreResult<()> {
        run_in_transaction(pool, "change username", move |conn| {
            Box::pin(async move {
                let result = sqlx::query("UPDATE users SET username = $1 WHERE user_id = $2")
                    .bind(&new_username)
                    .bind(id)
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| translate("update username", e))?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::NotFound { entity: "user", id });
                }

                Credential::rename(&mut *conn, id, &new_username).await
            })
        })
        .await
    }

    /// Changes a user's email address
    ///
    /// # Errors
    ///
    /// - `StoreError::EmailTaken` if another user has `new_email`
    /// - `StoreError::NotFound` if the user does not exist
    pub async fn change_email(pool: &PgPool, id: i32, new_email: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET email = $1 WHERE user_id = $2")
            .bind(new_email)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("update email", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "user", id });
        }

        Ok(())
    }

    /// Sets or clears a user's phone number
    pub async fn change_phone(pool: &PgPool, id: i32, phone: Option<&str>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET phone = $1 WHERE user_id = $2")
            .bind(phone)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("update phone", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "user", id });
        }

        Ok(())
    }

    /// Deletes a user by ID
    ///
    /// ⚠️  **WARNING**: The user's credential, habits, dailies and tasks are
    /// deleted with it (`ON DELETE CASCADE`).
    ///
    /// # Returns
    ///
    /// True if a user was deleted, false if none existed. Both are success.
    pub async fn delete(pool: &PgPool, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("delete user", e))?;

        Ok(result.rows_affected() > 0)
    }
}
