/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `ApiResult<T>`; store failures convert through
/// `From<StoreError>` so `?` picks the status code:
///
/// | Store error                                   | Status |
/// |-----------------------------------------------|--------|
/// | `UsernameTaken`, `EmailTaken`                 | 409    |
/// | `NotFound`                                    | 404    |
/// | `Connection`, `UnreachableStore`, `TimedOut`  | 503    |
/// | anything else                                 | 500    |
///
/// # Example
///
/// ```no_run
/// use habitforge_api::error::ApiResult;
/// use habitforge_store::models::user::User;
/// use axum::Json;
///
/// async fn handler(pool: sqlx::PgPool, id: i32) -> ApiResult<Json<Option<User>>> {
///     let user = User::find_by_id(&pool, id).await?;
///     Ok(Json(user))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use habitforge_store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate username
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "conflict", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message) = match self {
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::Conflict(msg) => ("conflict", msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            return ApiError::Conflict(err.to_string());
        }

        if err.is_unavailable() {
            tracing::warn!(error = ?err, "Store unavailable");
            return ApiError::ServiceUnavailable("Database temporarily unavailable".to_string());
        }

        match &err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            _ => ApiError::InternalError(format!("{:?}", err)),
        }
    }
}
