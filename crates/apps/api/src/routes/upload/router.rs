use crate::api_state::ApiContext;
use crate::routes::upload::handlers::{
    delete_upload_handler, download_upload_handler, get_upload_handler, get_upload_stats_handler,
    list_uploads_handler, submit_upload_handler, update_upload_handler,
};
use app_state::AppSettings;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tracing::info;

/// The anonymous upload route, rate limited per client address.
pub fn upload_guest_router(settings: &AppSettings) -> Result<Router<ApiContext>> {
    let rate_limiting = &settings.api.rate_limiting;
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rate_limiting.req_per_second)
        .burst_size(rate_limiting.burst_size)
        .finish()
        .ok_or_else(|| eyre!("Could not create rate-limiting governor."))?;
    info!(
        "Guest uploads limited to a burst of {} and 1 per {}s",
        rate_limiting.burst_size, rate_limiting.req_per_second
    );

    Ok(Router::new()
        .route("/upload/{access_code}", post(submit_upload_handler))
        .layer(DefaultBodyLimit::max(
            settings.api.max_upload_body_mb * 1024 * 1024,
        ))
        .layer(GovernorLayer::new(governor_conf)))
}

pub fn upload_protected_router() -> Router<ApiContext> {
    Router::new()
        .route("/albums/{album_id}/uploads", get(list_uploads_handler))
        .route(
            "/albums/{album_id}/uploads/stats",
            get(get_upload_stats_handler),
        )
        .route(
            "/albums/{album_id}/uploads/{upload_id}",
            get(get_upload_handler)
                .put(update_upload_handler)
                .delete(delete_upload_handler),
        )
        .route(
            "/albums/{album_id}/uploads/{upload_id}/download",
            get(download_upload_handler),
        )
}
