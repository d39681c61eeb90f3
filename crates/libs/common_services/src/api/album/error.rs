use crate::blob_store::BlobError;
use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AlbumError {
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

    #[error("No free access code after {0} attempts")]
    AccessCodeExhausted(u32),
}

fn log_error(error: &AlbumError) {
    match error {
        AlbumError::Database(e) => warn!("Database query failed: {}", e),
        AlbumError::Internal(e) => warn!("Internal error: {:?}", e),
        AlbumError::NotFound(id) => {
            warn!("Album -> Not found: {}", id);
        }
        AlbumError::Forbidden(id) => {
            warn!("Album -> Forbidden: {}", id);
        }
        AlbumError::BadRequest(message) => {
            warn!("Album -> Bad Request: {}", message);
        }
        AlbumError::Conflict(message) => {
            warn!("Album -> Conflict: {}", message);
        }
        AlbumError::AccessCodeExhausted(attempts) => {
            error!("Album -> Access code space exhausted after {} attempts", attempts);
        }
    }
}

impl IntoResponse for AlbumError {
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
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, format!("Album not found: {message}"))
            }
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, format!("Forbidden: {message}")),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {message}"))
            }
            Self::Conflict(message) => (StatusCode::CONFLICT, format!("Conflict: {message}")),
            Self::AccessCodeExhausted(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Could not allocate a unique access code, try again later.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for AlbumError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}

impl From<BlobError> for AlbumError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(key) => Self::NotFound(key),
            other => Self::Internal(eyre::Report::new(other)),
        }
    }
}

impl From<sqlx::Error> for AlbumError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<DbError> for AlbumError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { source, .. } => Self::Conflict(source.to_string()),
            DbError::Sqlx(sql_err) => {
                if matches!(sql_err, sqlx::Error::RowNotFound) {
                    Self::NotFound("row not found".into())
                } else {
                    Self::Database(sql_err)
                }
            }
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}
