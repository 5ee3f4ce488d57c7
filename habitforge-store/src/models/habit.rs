/// Habit model and database operations
///
/// A habit is a recurring behavior the user marks as good or bad; the store
/// keeps counters for both.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE habits (
///     id SERIAL PRIMARY KEY,
///     user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
///     text VARCHAR(63) NOT NULL,
///     note VARCHAR(255),
///     good BOOLEAN NOT NULL DEFAULT TRUE,
///     bad BOOLEAN NOT NULL DEFAULT FALSE,
///     difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
///     count_reset_after INT NOT NULL DEFAULT 0,
///     good_count INT NOT NULL DEFAULT 0,
///     bad_count INT NOT NULL DEFAULT 0
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use habitforge_store::models::habit::{CreateHabit, Habit};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i32) -> Result<(), Box<dyn std::error::Error>> {
/// let habit = Habit::create(&pool, CreateHabit {
///     user_id,
///     text: "Run".to_string(),
///     note: None,
///     good: true,
///     bad: false,
///     difficulty: 3,
///     count_reset_after: 0,
///     good_count: 0,
///     bad_count: 0,
/// })
/// .await?;
///
/// let habits = Habit::list_by_owner(&pool, user_id).await?;
/// assert!(habits.iter().any(|h| h.id == habit.id));
/// # Ok(())
/// # }
/// ```

use crate::constraint::translate;
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habit {
    pub id: i32,

    /// Owning user
    pub user_id: i32,

    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub good: bool,
    pub bad: bool,

    /// 1 (trivial) to 5 (hard), enforced by the store
    pub difficulty: i32,

    pub count_reset_after: i32,
    pub good_count: i32,
    pub bad_count: i32,
}

/// Input for creating a habit
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHabit {
    pub user_id: i32,
    pub text: String,
    pub note: Option<String>,
    pub good: bool,
    pub bad: bool,
    pub difficulty: i32,
    pub count_reset_after: i32,
    pub good_count: i32,
    pub bad_count: i32,
}

impl Habit {
    /// Creates a habit
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the owner does not exist or `difficulty`
    /// is out of range
    pub async fn create(pool: &PgPool, data: CreateHabit) -> StoreResult<Self> {
        sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (
                user_id, text, note, good, bad, difficulty,
                count_reset_after, good_count, bad_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, text, note, good, bad, difficulty,
                      count_reset_after, good_count, bad_count
            "#,
        )
        .bind(data.user_id)
        .bind(data.text)
        .bind(data.note)
        .bind(data.good)
        .bind(data.bad)
        .bind(data.difficulty)
        .bind(data.count_reset_after)
        .bind(data.good_count)
        .bind(data.bad_count)
        .fetch_one(pool)
        .await
        .map_err(|e| translate("insert habit", e))
    }

    /// Finds a habit by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, text, note, good, bad, difficulty,
                   count_reset_after, good_count, bad_count
            FROM habits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load habit", e))
    }

    /// Lists a user's habits in creation order
    ///
    /// Empty if the user has none or does not exist.
    pub async fn list_by_owner(pool: &PgPool, user_id: i32) -> StoreResult<Vec<Self>> {
        sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, text, note, good, bad, difficulty,
                   count_reset_after, good_count, bad_count
            FROM habits
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::read("list habits", e))
    }

    /// Replaces every mutable field of the habit with `habit`'s values
    ///
    /// Last write wins. The owner is not changed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no habit has `habit.id`
    pub async fn update(pool: &PgPool, habit: &Habit) -> StoreResult<Self> {
        sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits
            SET text = $1, note = $2, good = $3, bad = $4,
                difficulty = $5, count_reset_after = $6,
                good_count = $7, bad_count = $8
            WHERE id = $9
            RETURNING id, user_id, text, note, good, bad, difficulty,
                      count_reset_after, good_count, bad_count
            "#,
        )
        .bind(&habit.text)
        .bind(&habit.note)
        .bind(habit.good)
        .bind(habit.bad)
        .bind(habit.difficulty)
        .bind(habit.count_reset_after)
        .bind(habit.good_count)
        .bind(habit.bad_count)
        .bind(habit.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| translate("update habit", e))?
        .ok_or(StoreError::NotFound {
            entity: "habit",
            id: habit.id,
        })
    }

    /// Deletes a habit by ID
    ///
    /// # Returns
    ///
    /// True if a habit was deleted, false if none existed. Both are success.
    pub async fn delete(pool: &PgPool, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("delete habit", e))?;

        Ok(result.rows_affected() > 0)
    }
}
