/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL server URL without a database path (required)
/// - `DATABASE_NAME`: Database to bootstrap and use (default: habitforge)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: Idle connections kept open (default: 2)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECONDS`: Wait for a free connection (default: 30)
/// - `DATABASE_STATEMENT_TIMEOUT_MS`: Server-side statement timeout, 0 disables (default: 30000)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `RUST_LOG`: Log filter (default: habitforge_api=debug,habitforge_store=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use habitforge_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use habitforge_store::db::pool::DatabaseConfig;
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database pool and bootstrap configuration
    pub database: DatabaseConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable
    /// does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DatabaseConfig::default();

        let server_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let statement_timeout_ms: u64 = parse_or(
            &lookup,
            "DATABASE_STATEMENT_TIMEOUT_MS",
            defaults.statement_timeout_ms.unwrap_or(0),
        )?;

        let database = DatabaseConfig {
            server_url,
            database: lookup("DATABASE_NAME").unwrap_or(defaults.database.clone()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
            acquire_timeout_seconds: parse_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
                defaults.acquire_timeout_seconds,
            )?,
            statement_timeout_ms: (statement_timeout_ms > 0).then_some(statement_timeout_ms),
            ..defaults
        };

        if database.min_connections > database.max_connections {
            anyhow::bail!("DATABASE_MIN_CONNECTIONS must not exceed DATABASE_MAX_CONNECTIONS");
        }

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8080)?,
            },
            database,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, value)),
        None => Ok(default),
    }
}
