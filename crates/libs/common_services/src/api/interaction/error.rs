use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("Database error")]
    Database(sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

fn log_error(error: &InteractionError) {
    match error {
        InteractionError::Database(e) => warn!("Database query failed: {}", e),
        InteractionError::Internal(e) => warn!("Internal error: {:?}", e),
        InteractionError::NotFound(id) => warn!("Interaction -> Not found: {}", id),
        InteractionError::Forbidden(message) => warn!("Interaction -> Forbidden: {}", message),
        InteractionError::BadRequest(message) => {
            warn!("Interaction -> Bad Request: {}", message);
        }
        InteractionError::Conflict(message) => warn!("Interaction -> Conflict: {}", message),
    }
}

impl IntoResponse for InteractionError {
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
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, format!("Forbidden: {message}")),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {message}"))
            }
            Self::Conflict(message) => (StatusCode::CONFLICT, format!("Conflict: {message}")),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for InteractionError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<DbError> for InteractionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { source, .. } => Self::Conflict(source.to_string()),
            DbError::Sqlx(sqlx::Error::RowNotFound) => Self::NotFound("row not found".into()),
            DbError::Sqlx(sql_err) => Self::Database(sql_err),
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}
