/// Daily model and database operations
///
/// A daily repeats on a schedule starting at `start_date`: every
/// `repeat_every_x` units of `repeat_every`, optionally restricted to the
/// weekdays encoded in `day_weeks`. `streak` counts consecutive completions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE dailies (
///     id SERIAL PRIMARY KEY,
///     user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
///     text VARCHAR(63) NOT NULL,
///     note VARCHAR(255),
///     difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
///     start_date DATE NOT NULL,
///     repeat_every INT NOT NULL DEFAULT 0,
///     repeat_every_x INT NOT NULL,
///     dayweeks VARCHAR(32) DEFAULT NULL,
///     streak INT NOT NULL DEFAULT 0
/// );
/// ```

use crate::constraint::translate;
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Daily {
    pub id: i32,
    pub user_id: i32,
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub difficulty: i32,
    pub start_date: NaiveDate,
    pub repeat_every: i32,
    pub repeat_every_x: i32,

    /// Encoded weekday set, stored as-is
    #[sqlx(rename = "dayweeks")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_weeks: Option<String>,

    pub streak: i32,
}

/// Input for creating a daily
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDaily {
    pub user_id: i32,
    pub text: String,
    pub note: Option<String>,
    pub difficulty: i32,
    pub start_date: NaiveDate,
    pub repeat_every: i32,
    pub repeat_every_x: i32,
    pub day_weeks: Option<String>,
    pub streak: i32,
}

impl Daily {
    pub async fn create(pool: &PgPool, data: CreateDaily) -> StoreResult<Self> {
        sqlx::query_as::<_, Daily>(
            r#"
            INSERT INTO dailies (
                user_id, text, note, difficulty, start_date,
                repeat_every, repeat_every_x, dayweeks, streak)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, text, note, difficulty, start_date,
                      repeat_every, repeat_every_x, dayweeks, streak
            "#,
        )
        .bind(data.user_id)
        .bind(data.text)
        .bind(data.note)
        .bind(data.difficulty)
        .bind(data.start_date)
        .bind(data.repeat_every)
        .bind(data.repeat_every_x)
        .bind(data.day_weeks)
        .bind(data.streak)
        .fetch_one(pool)
        .await
        .map_err(|e| translate("insert daily", e))
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Daily>(
            r#"
            SELECT id, user_id, text, note, difficulty, start_date,
                   repeat_every, repeat_every_x, dayweeks, streak
            FROM dailies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load daily", e))
    }

    /// Lists a user's dailies in creation order
    pub async fn list_by_owner(pool: &PgPool, user_id: i32) -> StoreResult<Vec<Self>> {
        sqlx::query_as::<_, Daily>(
            r#"
            SELECT id, user_id, text, note, difficulty, start_date,
                   repeat_every, repeat_every_x, dayweeks, streak
            FROM dailies
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::read("list dailies", e))
    }

    /// Replaces every mutable field of the daily with `daily`'s values
    pub async fn update(pool: &PgPool, daily: &Daily) -> StoreResult<Self> {
        sqlx::query_as::<_, Daily>(
            r#"
            UPDATE dailies
            SET text = $1, note = $2, difficulty = $3,
                start_date = $4, repeat_every = $5,
                repeat_every_x = $6, dayweeks = $7,
                streak = $8
            WHERE id = $9
            RETURNING id, user_id, text, note, difficulty, start_date,
                      repeat_every, repeat_every_x, dayweeks, streak
            "#,
        )
        .bind(&daily.text)
        .bind(&daily.note)
        .bind(daily.difficulty)
        .bind(daily.start_date)
        .bind(daily.repeat_every)
        .bind(daily.repeat_every_x)
        .bind(&daily.day_weeks)
        .bind(daily.streak)
        .bind(daily.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| translate("update daily", e))?
        .ok_or(StoreError::NotFound {
            entity: "daily",
            id: daily.id,
        })
    }

    /// Deletes a daily; true if one was removed
    pub async fn delete(pool: &PgPool, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM dailies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("delete daily", e))?;

        Ok(result.rows_affected() > 0)
    }
}
