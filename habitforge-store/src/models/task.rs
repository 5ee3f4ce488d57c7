/// Task model and database operations
///
/// One-off to-dos with a deadline.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
///     name VARCHAR(63) NOT NULL,
///     note VARCHAR(255),
///     difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
///     deadline DATE NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use crate::constraint::translate;
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,
    pub user_id: i32,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub difficulty: i32,
    pub deadline: NaiveDate,
    pub completed: bool,
}

/// Input for creating a task
///
/// New tasks always start out not completed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub user_id: i32,
    pub name: String,
    pub note: Option<String>,
    pub difficulty: i32,
    pub deadline: NaiveDate,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> StoreResult<Self> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, name, note, difficulty, deadline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, note, difficulty, deadline, completed
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.note)
        .bind(data.difficulty)
        .bind(data.deadline)
        .fetch_one(pool)
        .await
        .map_err(|e| translate("insert task", e))
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, name, note, difficulty, deadline, completed
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::read("load task", e))
    }

    pub async fn list_by_owner(pool: &PgPool, user_id: i32) -> StoreResult<Vec<Self>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, name, note, difficulty, deadline, completed
            FROM tasks
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::read("list tasks", e))
    }

    /// Replaces name, note, difficulty, deadline and completion
    pub async fn update(pool: &PgPool, task: &Task) -> StoreResult<Self> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $1, note = $2, difficulty = $3,
                deadline = $4, completed = $5
            WHERE id = $6
            RETURNING id, user_id, name, note, difficulty, deadline, completed
            "#,
        )
        .bind(&task.name)
        .bind(&task.note)
        .bind(task.difficulty)
        .bind(task.deadline)
        .bind(task.completed)
        .bind(task.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| translate("update task", e))?
        .ok_or(StoreError::NotFound {
            entity: "task",
            id: task.id,
        })
    }

    pub async fn delete(pool: &PgPool, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| translate("delete task", e))?;

        Ok(result.rows_affected() > 0)
    }
}
