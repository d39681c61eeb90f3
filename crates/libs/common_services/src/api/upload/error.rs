use crate::blob_store::BlobError;
use crate::database::DbError;
use crate::database::album::album::AlbumStatus;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Reasons a guest submission is turned away before anything is stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("album is {0} and not accepting uploads")]
    AlbumNotActive(AlbumStatus),

    #[error("album has expired")]
    AlbumExpired,

    #[error("file is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: i64, limit: i64 },

    #[error("file type '{0}' is not allowed in this album")]
    FileTypeNotAllowed(String),

    #[error("upload limit of {0} files per person reached")]
    UploadLimitReached(i64),

    #[error("file is empty")]
    EmptyFile,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Database error")]
    Database(sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Upload rejected: {0}")]
    Rejected(#[from] PolicyViolation),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),
}

fn log_error(error: &UploadError) {
    match error {
        UploadError::Database(e) => warn!("Database query failed: {}", e),
        UploadError::Internal(e) => warn!("Internal error: {:?}", e),
        UploadError::Rejected(reason) => warn!("Upload -> Rejected: {}", reason),
        UploadError::NotFound(id) => warn!("Upload -> Not found: {}", id),
        UploadError::Forbidden(message) => warn!("Upload -> Forbidden: {}", message),
        UploadError::BadRequest(message) => warn!("Upload -> Bad Request: {}", message),
    }
}

impl IntoResponse for UploadError {
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
            Self::Rejected(reason) => (StatusCode::BAD_REQUEST, reason.to_string()),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, format!("Not found: {message}")),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, format!("Forbidden: {message}")),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {message}"))
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for UploadError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}

impl From<BlobError> for UploadError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(key) => Self::NotFound(key),
            other => Self::Internal(eyre::Report::new(other)),
        }
    }
}

impl From<sqlx::Error> for UploadError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<DbError> for UploadError {
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
