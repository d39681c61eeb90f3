use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Database error")]
    Database(sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Email {0} cannot be retried")]
    NotRetryable(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

fn log_error(error: &NotificationError) {
    match error {
        NotificationError::Database(e) => warn!("Database query failed: {}", e),
        NotificationError::Internal(e) => warn!("Internal error: {:?}", e),
        NotificationError::NotFound(id) => warn!("Notification -> Not found: {}", id),
        NotificationError::BadRequest(message) => {
            warn!("Notification -> Bad Request: {}", message);
        }
        NotificationError::NotRetryable(id) => {
            warn!("Notification -> Email {} cannot be retried", id);
        }
        NotificationError::Conflict(message) => warn!("Notification -> Conflict: {}", message),
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, format!("Not found: {message}")),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {message}"))
            }
            Self::NotRetryable(id) => (
                StatusCode::CONFLICT,
                format!("Email {id} is not failed or has no retries left"),
            ),
            Self::Conflict(message) => (StatusCode::CONFLICT, format!("Conflict: {message}")),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for NotificationError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<DbError> for NotificationError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sqlx::Error::RowNotFound) => Self::NotFound("row not found".into()),
            DbError::Sqlx(sql_err) | DbError::UniqueViolation { source: sql_err, .. } => {
                Self::Database(sql_err)
            },
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}
