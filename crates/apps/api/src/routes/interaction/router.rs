use crate::api_state::ApiContext;
use crate::routes::interaction::handlers::{
    add_comment_handler, bulk_moderate_handler, list_comments_handler, list_reports_handler,
    moderate_upload_handler, report_upload_handler, resolve_report_handler, toggle_like_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn interaction_protected_router() -> Router<ApiContext> {
    Router::new()
        .route(
            "/albums/{album_id}/uploads/{upload_id}/like",
            post(toggle_like_handler),
        )
        .route(
            "/albums/{album_id}/uploads/{upload_id}/comments",
            get(list_comments_handler).post(add_comment_handler),
        )
        .route(
            "/albums/{album_id}/uploads/{upload_id}/report",
            post(report_upload_handler),
        )
        .route(
            "/albums/{album_id}/uploads/bulk-moderate",
            post(bulk_moderate_handler),
        )
        .route("/albums/{album_id}/reports", get(list_reports_handler))
        .route("/reports/{report_id}/resolve", post(resolve_report_handler))
        .route("/uploads/{upload_id}/moderate", post(moderate_upload_handler))
}
