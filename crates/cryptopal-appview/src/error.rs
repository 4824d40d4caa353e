use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::dashboard::DashboardError;

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    /// Upstream failed and nothing was cached
    BadGateway(String),
    /// Call budget spent and nothing was cached
    ServiceUnavailable(String),
    Internal(String),
    Database(sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Not authorized, no valid session".into(),
            ),
            AppError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Upstream failure reached the client");
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (
            status,
            axum::Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<DashboardError> for AppError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Store(e) => AppError::Database(e),
            other => {
                let message = other.to_string();
                match other.status_hint() {
                    Some(400) => AppError::BadRequest(message),
                    Some(404) => AppError::NotFound(message),
                    Some(502) => AppError::BadGateway(message),
                    Some(503) => AppError::ServiceUnavailable(message),
                    _ => AppError::Internal(message),
                }
            }
        }
    }
}
