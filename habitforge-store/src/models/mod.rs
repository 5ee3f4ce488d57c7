/// Database models for Habitforge
///
/// Each module holds one entity and its repository operations.
///
/// # Models
///
/// - `user`: User profiles, registration and username changes
/// - `credential`: Per-user credentials keyed for username lookup
/// - `habit`: Recurring good/bad behaviors with counters
/// - `daily`: Scheduled repeating tasks with streaks
/// - `task`: One-off tasks with deadlines
///
/// # Example
///
/// ```no_run
/// use habitforge_store::models::user::{RegisterUser, User};
/// use habitforge_store::models::habit::Habit;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::register(&pool, RegisterUser {
///     username: "bob".to_string(),
///     email: "bob@x.com".to_string(),
///     phone: None,
///     password: "opaque-secret".to_string(),
/// })
/// .await?;
///
/// let habits = Habit::list_by_owner(&pool, user.id).await?;
/// assert!(habits.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod credential;
pub mod daily;
pub mod habit;
pub mod task;
pub mod user;
