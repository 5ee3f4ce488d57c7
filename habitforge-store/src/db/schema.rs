/// Schema bootstrapper
///
/// Creates the application database and its five tables when they are absent.
/// Every statement is "create if not exists", and "already exists" errors from
/// concurrent bootstraps are ignored, so this runs safely on every process
/// start.
///
/// # Tables
///
/// Created in dependency order:
///
/// 1. `users` - profile rows, unique username and email
/// 2. `passwords` - one credential per user, keyed by `user_id`
/// 3. `habits`
/// 4. `dailies`
/// 5. `tasks`
///
/// Every child table references `users(user_id)` with `ON DELETE CASCADE`.
/// `habits`, `dailies` and `tasks` bound `difficulty` to 1..=5 with a check
/// constraint.
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

use crate::db::pool::{create_pool, DatabaseConfig};
use crate::error::{StoreError, StoreResult};
use sqlx::postgres::PgPool;
use sqlx::{Connection, Executor, PgConnection};
use tracing::{debug, info, warn};

/// SQLSTATE for `duplicate_database`
const DUPLICATE_DATABASE: &str = "42P04";

/// SQLSTATE for `duplicate_table`
const DUPLICATE_TABLE: &str = "42P07";

/// SQLSTATE for `duplicate_object`
const DUPLICATE_OBJECT: &str = "42710";

/// Concurrent creates can collide on a catalog's unique index instead of
/// reporting a duplicate
const UNIQUE_VIOLATION: &str = "23505";

/// One table of the application schema
#[derive(Debug, Clone, Copy)]
pub struct TableDefinition {
    pub name: &'static str,
    pub ddl: &'static str,
}

/// The application schema, in creation order
pub const TABLES: [TableDefinition; 5] = [
    TableDefinition {
        name: "users",
        ddl: r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id SERIAL PRIMARY KEY,
                username VARCHAR(255) UNIQUE NOT NULL,
                email VARCHAR(255) UNIQUE NOT NULL,
                phone VARCHAR(20),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#,
    },
    TableDefinition {
        name: "passwords",
        ddl: r#"
            CREATE TABLE IF NOT EXISTS passwords (
                user_id INTEGER PRIMARY KEY,
                username VARCHAR(255) UNIQUE NOT NULL,
                password VARCHAR(255) NOT NULL,
                CONSTRAINT fk_passwords_user
                    FOREIGN KEY (user_id)
                    REFERENCES users (user_id)
                    ON DELETE CASCADE
            )
        "#,
    },
    TableDefinition {
        name: "habits",
        ddl: r#"
            CREATE TABLE IF NOT EXISTS habits (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL,
                text VARCHAR(63) NOT NULL,
                note VARCHAR(255),
                good BOOLEAN NOT NULL DEFAULT TRUE,
                bad BOOLEAN NOT NULL DEFAULT FALSE,
                difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                count_reset_after INT NOT NULL DEFAULT 0,
                good_count INT NOT NULL DEFAULT 0,
                bad_count INT NOT NULL DEFAULT 0,
                CONSTRAINT fk_habits_user
                    FOREIGN KEY (user_id)
                    REFERENCES users (user_id)
                    ON DELETE CASCADE
            )
        "#,
    },
    TableDefinition {
        name: "dailies",
        ddl: r#"
            CREATE TABLE IF NOT EXISTS dailies (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL,
                text VARCHAR(63) NOT NULL,
                note VARCHAR(255),
                difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                start_date DATE NOT NULL,
                repeat_every INT NOT NULL DEFAULT 0,
                repeat_every_x INT NOT NULL,
                dayweeks VARCHAR(32) DEFAULT NULL,
                streak INT NOT NULL DEFAULT 0,
                CONSTRAINT fk_dailies_user
                    FOREIGN KEY (user_id)
                    REFERENCES users (user_id)
                    ON DELETE CASCADE
            )
        "#,
    },
    TableDefinition {
        name: "tasks",
        ddl: r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name VARCHAR(63) NOT NULL,
                note VARCHAR(255),
                difficulty INT NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                deadline DATE NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                CONSTRAINT fk_tasks_user
                    FOREIGN KEY (user_id)
                    REFERENCES users (user_id)
                    ON DELETE CASCADE
            )
        "#,
    },
];

/// Which application tables exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    /// Tables present, in creation order
    pub present: Vec<&'static str>,

    /// Tables missing, in creation order
    pub missing: Vec<&'static str>,
}

impl SchemaStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Creates the database if needed, then the tables, and returns a pool
/// connected to it
///
/// # Errors
///
/// Fatal for the process:
/// - `StoreError::UnreachableStore` if the server cannot be reached
/// - `StoreError::InvalidDatabaseName` if `config.database` is not an identifier
/// - `StoreError::Schema` if a create statement fails for another reason
pub async fn bootstrap(config: &DatabaseConfig) -> StoreResult<PgPool> {
    ensure_database_exists(config).await?;

    let pool = create_pool(config).await?;
    create_tables(&pool).await?;

    info!(database = %config.database, "Database schema bootstrapped");
    Ok(pool)
}

/// Creates `config.database` on the server if it does not exist yet
///
/// Connects to the maintenance database, pings it, and issues
/// `CREATE DATABASE`. A "database already exists" answer, including one caused
/// by a concurrent bootstrap, counts as success.
pub async fn ensure_database_exists(config: &DatabaseConfig) -> StoreResult<()> {
    let name = quote_identifier(&config.database)?;
    let mut conn = connect_maintenance(config).await?;

    debug!(database = %config.database, "Ensuring database exists");

    let result = conn
        .execute(format!("CREATE DATABASE {}", name).as_str())
        .await;

    let outcome = match result {
        Ok(_) => {
            info!(database = %config.database, "Database created");
            Ok(())
        }
        Err(err) if has_code(&err, &[DUPLICATE_DATABASE, UNIQUE_VIOLATION]) => {
            debug!(database = %config.database, "Database already exists");
            Ok(())
        }
        Err(err) => Err(StoreError::Schema {
            object: format!("database {}", config.database),
            source: err,
        }),
    };

    close_quietly(conn).await;
    outcome
}

/// Creates each application table that is missing, in dependency order
pub async fn create_tables(pool: &PgPool) -> StoreResult<()> {
    for table in TABLES {
        match pool.execute(table.ddl).await {
            Ok(_) => debug!(table = table.name, "Table ready"),
            Err(err) if has_code(&err, &[DUPLICATE_TABLE, DUPLICATE_OBJECT, UNIQUE_VIOLATION]) => {
                debug!(table = table.name, "Table created concurrently");
            }
            Err(err) => {
                return Err(StoreError::Schema {
                    object: format!("table {}", table.name),
                    source: err,
                })
            }
        }
    }

    Ok(())
}

/// Reports which of the application tables exist in the public schema
pub async fn schema_status(pool: &PgPool) -> StoreResult<SchemaStatus> {
    let existing: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = 'public'
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::read("read schema status", e))?;

    let (present, missing) = TABLES
        .iter()
        .map(|table| table.name)
        .partition(|name| existing.iter().any(|existing| existing == name));

    Ok(SchemaStatus { present, missing })
}

/// Drops `config.database` (USE WITH CAUTION!)
///
/// Meant for test environments. Open connections to the database make the
/// drop fail.
pub async fn drop_database(config: &DatabaseConfig) -> StoreResult<()> {
    let name = quote_identifier(&config.database)?;
    let mut conn = connect_maintenance(config).await?;

    warn!(database = %config.database, "Dropping database");

    let result = conn
        .execute(format!("DROP DATABASE IF EXISTS {}", name).as_str())
        .await;

    close_quietly(conn).await;

    result.map(|_| ()).map_err(|err| StoreError::Schema {
        object: format!("database {}", config.database),
        source: err,
    })
}

async fn connect_maintenance(config: &DatabaseConfig) -> StoreResult<PgConnection> {
    let options = config.connect_options(&config.maintenance_database)?;

    let mut conn = PgConnection::connect_with(&options)
        .await
        .map_err(StoreError::UnreachableStore)?;

    conn.ping().await.map_err(StoreError::UnreachableStore)?;
    Ok(conn)
}

async fn close_quietly(conn: PgConnection) {
    if let Err(err) = conn.close().await {
        debug!(error = %err, "Failed to close maintenance connection");
    }
}

/// Double-quotes a database name after checking it is a plain identifier
///
/// `CREATE DATABASE` cannot take a bind parameter, so the name is spliced into
/// the statement and must not carry anything else.
fn quote_identifier(name: &str) -> StoreResult<String> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(StoreError::InvalidDatabaseName(name.to_string()))
    }
}

fn has_code(err: &sqlx::Error, codes: &[&str]) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map_or(false, |code| codes.iter().any(|c| code == *c)),
        _ => false,
    }
}
