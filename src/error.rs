use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the stats dashboard.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Auth Errors ─────────────────────────────────────────────────────
    /// Missing or invalid authorization code / state, or the provider
    /// rejected the code exchange.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    // ── Remote API Errors ───────────────────────────────────────────────
    #[error("Spotify API error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RemoteApi {
        status: Option<u16>,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a `RemoteApi` error from a non-success HTTP status.
    pub fn remote(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        AppError::RemoteApi {
            status: Some(status.as_u16()),
            message: message.into(),
        }
    }

    /// HTTP status reported by the remote API, if the request got that far.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            AppError::RemoteApi { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        AppError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::RemoteApi {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Authorization(_) => (StatusCode::BAD_REQUEST, "authorization_error"),
            AppError::RefreshFailed(_) => (StatusCode::BAD_GATEWAY, "refresh_failed"),
            AppError::RemoteApi { status, .. } => match status {
                Some(401) => (StatusCode::UNAUTHORIZED, "remote_unauthorized"),
                Some(404) => (StatusCode::NOT_FOUND, "remote_not_found"),
                Some(429) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                _ => (StatusCode::BAD_GATEWAY, "remote_api_error"),
            },
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
