/// Health check endpoint
///
/// Reports whether the store answers and whether all five application tables
/// exist.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "database_name": "habitforge",
///   "missing_tables": []
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use habitforge_store::db::pool::{health_check as ping, with_deadline};
use habitforge_store::db::schema::schema_status;
use habitforge_store::StoreError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long the probe waits on the store before reporting it disconnected
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Application version
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,

    /// Database the server was configured to use
    pub database_name: String,

    /// Application tables not found in the database
    pub missing_tables: Vec<String>,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = with_deadline("health check", PROBE_TIMEOUT, async {
        ping(&state.db).await.map_err(StoreError::Connection)
    })
    .await;

    let missing_tables: Option<Vec<String>> = match connected {
        Ok(()) => match with_deadline("schema status", PROBE_TIMEOUT, schema_status(&state.db)).await {
            Ok(status) => Some(status.missing.iter().map(|t| t.to_string()).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "Schema status unavailable");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            None
        }
    };

    let database_name = state.config.database.database.clone();

    let response = match missing_tables {
        Some(missing) => HealthResponse {
            status: if missing.is_empty() { "healthy" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: "connected".to_string(),
            database_name,
            missing_tables: missing,
        },
        None => HealthResponse {
            status: "degraded".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: "disconnected".to_string(),
            database_name,
            missing_tables: Vec::new(),
        },
    };

    Ok(Json(response))
}
