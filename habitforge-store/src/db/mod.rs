/// Database layer for Habitforge
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool, scoped acquisition and deadlines
/// - `schema`: Idempotent database and table bootstrap
/// - `transaction`: Atomic multi-statement units
/// - Repositories are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use habitforge_store::db::pool::DatabaseConfig;
/// use habitforge_store::db::schema::bootstrap;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         server_url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = bootstrap(&config).await?;
///     Ok(())
/// }
/// ```

pub mod pool;
pub mod schema;
pub mod transaction;
