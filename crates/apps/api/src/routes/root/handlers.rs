use crate::api_state::ApiContext;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::error;

#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    responses(
        (status = 200, description = "Root message")
    )
)]
pub async fn root() -> &'static str {
    "EventVault API"
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "API is healthy and ready to accept traffic", body = String),
        (status = 503, description = "Database or media storage is unavailable")
    )
)]
pub async fn health_check(State(context): State<ApiContext>) -> Result<&'static str, StatusCode> {
    if let Err(e) = sqlx::query("SELECT 1").fetch_one(&context.pool).await {
        error!("Health check failed: database connection error: {}", e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let media_root = &context.settings.storage.media_root;
    match tokio::fs::metadata(media_root).await {
        Ok(meta) if meta.is_dir() => Ok("OK"),
        Ok(_) => {
            error!("Health check failed: {} is not a directory", media_root.display());
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            error!("Health check failed: media root {} unreadable: {}", media_root.display(), e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
