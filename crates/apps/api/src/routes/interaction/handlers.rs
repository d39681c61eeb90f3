use crate::api_state::ApiContext;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::album::interfaces::AlbumIdParams;
use common_services::api::interaction::error::InteractionError;
use common_services::api::interaction::interfaces::{
    BulkModerateRequest, BulkModerateResponse, CreateCommentRequest, CreateReportRequest,
    ListReportsParams, ModerateUploadRequest, ReportIdParams, ToggleLikeResponse,
};
use common_services::api::interaction::service::{
    add_comment, bulk_moderate, list_comments, list_reports, moderate_upload, report_upload,
    resolve_report, toggle_like,
};
use common_services::api::upload::interfaces::{AlbumUploadParams, UploadIdParams};
use common_services::database::app_user::User;
use common_services::database::interaction::{UploadComment, UploadReport};
use common_services::database::upload::Upload;
use tracing::instrument;

/// Like an upload, or remove the like if the user already liked it.
#[utoipa::path(
    post,
    path = "/albums/{album_id}/uploads/{upload_id}/like",
    tag = "Interaction",
    params(AlbumUploadParams),
    responses(
        (status = 200, description = "The new like state.", body = ToggleLikeResponse),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn toggle_like_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
) -> Result<Json<ToggleLikeResponse>, InteractionError> {
    let response =
        toggle_like(&context.pool, &params.album_id, &params.upload_id, &user).await?;
    Ok(Json(response))
}

/// List the comments on an upload, oldest first.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/uploads/{upload_id}/comments",
    tag = "Interaction",
    params(AlbumUploadParams),
    responses(
        (status = 200, description = "Comments on the upload.", body = Vec<UploadComment>),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_comments_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
) -> Result<Json<Vec<UploadComment>>, InteractionError> {
    let comments =
        list_comments(&context.pool, &params.album_id, &params.upload_id, &user).await?;
    Ok(Json(comments))
}

/// Comment on an upload, or reply to another comment on it.
#[utoipa::path(
    post,
    path = "/albums/{album_id}/uploads/{upload_id}/comments",
    tag = "Interaction",
    params(AlbumUploadParams),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created.", body = UploadComment),
        (status = 400, description = "Empty or too long comment, or an invalid parent."),
        (status = 403, description = "Comments are disabled on this album."),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn add_comment_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<UploadComment>), InteractionError> {
    let comment = add_comment(
        &context.pool,
        &context.mailer,
        &params.album_id,
        &params.upload_id,
        &user,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Report an upload. Each user can report an upload once.
#[utoipa::path(
    post,
    path = "/albums/{album_id}/uploads/{upload_id}/report",
    tag = "Interaction",
    params(AlbumUploadParams),
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report filed.", body = UploadReport),
        (status = 404, description = "Upload not found or not visible to the user."),
        (status = 409, description = "The user already reported this upload."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn report_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<UploadReport>), InteractionError> {
    let report = report_upload(
        &context.pool,
        &params.album_id,
        &params.upload_id,
        &user,
        &payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// List the reports filed against an album's uploads. Moderators only.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/reports",
    tag = "Interaction",
    params(AlbumIdParams, ListReportsParams),
    responses(
        (status = 200, description = "Reports, newest first.", body = Vec<UploadReport>),
        (status = 403, description = "The user does not moderate this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reports_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Query(query): Query<ListReportsParams>,
) -> Result<Json<Vec<UploadReport>>, InteractionError> {
    let reports = list_reports(
        &context.pool,
        &params.album_id,
        &user,
        query.include_resolved,
    )
    .await?;
    Ok(Json(reports))
}

/// Mark a report as handled.
#[utoipa::path(
    post,
    path = "/reports/{report_id}/resolve",
    tag = "Interaction",
    params(ReportIdParams),
    responses(
        (status = 200, description = "The resolved report.", body = UploadReport),
        (status = 403, description = "The user does not moderate the reported album."),
        (status = 404, description = "Report not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn resolve_report_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<ReportIdParams>,
) -> Result<Json<UploadReport>, InteractionError> {
    Ok(Json(
        resolve_report(&context.pool, params.report_id, &user).await?,
    ))
}

/// Approve or reject a single upload.
#[utoipa::path(
    post,
    path = "/uploads/{upload_id}/moderate",
    tag = "Interaction",
    params(UploadIdParams),
    request_body = ModerateUploadRequest,
    responses(
        (status = 200, description = "The moderated upload.", body = Upload),
        (status = 400, description = "The target status is not approved or rejected."),
        (status = 403, description = "The user does not moderate the upload's album."),
        (status = 404, description = "Upload not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn moderate_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<UploadIdParams>,
    Json(payload): Json<ModerateUploadRequest>,
) -> Result<Json<Upload>, InteractionError> {
    let upload = moderate_upload(&context.pool, &params.upload_id, &user, &payload).await?;
    Ok(Json(upload))
}

/// Approve, reject or delete many uploads of one album at once.
#[utoipa::path(
    post,
    path = "/albums/{album_id}/uploads/bulk-moderate",
    tag = "Interaction",
    params(AlbumIdParams),
    request_body = BulkModerateRequest,
    responses(
        (status = 200, description = "How many uploads were changed.", body = BulkModerateResponse),
        (status = 400, description = "No upload ids given."),
        (status = 403, description = "The user does not moderate this album."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn bulk_moderate_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Json(payload): Json<BulkModerateRequest>,
) -> Result<Json<BulkModerateResponse>, InteractionError> {
    let response = bulk_moderate(
        &context.pool,
        context.blobs.as_ref(),
        &params.album_id,
        &user,
        payload,
    )
    .await?;
    Ok(Json(response))
}
