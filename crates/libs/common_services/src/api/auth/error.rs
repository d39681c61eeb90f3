use crate::database::DbError;
use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Rejections raised while identifying the caller of a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token")]
    MissingToken,

    #[error("bearer token rejected")]
    InvalidToken,

    #[error("caller not resolved before role check")]
    UserNotFound,

    #[error("{user_email} lacks the role for {path}")]
    PermissionDenied { user_email: String, path: String },

    #[error("user mirror failed")]
    Database(#[from] DbError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

impl AuthError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Database(e) => {
                error!("Auth -> storing caller failed: {e}");
                "An internal error occurred"
            }
            Self::Internal(e) => {
                error!("Auth -> internal error: {e:?}");
                "An internal error occurred"
            }
            Self::PermissionDenied { .. } => {
                warn!("Auth -> {self}");
                "Permission denied"
            }
            _ => {
                warn!("Auth -> {self}");
                "Authentication failed"
            }
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
