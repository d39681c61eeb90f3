use crate::api_state::ApiContext;
use crate::auth::middlewares::optional_user::OptionalUser;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use axum::{Extension, Json};
use color_eyre::eyre::Report;
use common_services::api::album::interfaces::{AccessCodeParams, AlbumIdParams};
use common_services::api::upload::error::UploadError;
use common_services::api::upload::interfaces::{
    AlbumUploadParams, IncomingFile, UpdateUploadRequest, UploadDetailResponse, UploadForm,
    UploadListFilter, UploadReceipt, UploadResponse, UploadStatsResponse, UploadSummary,
    UploaderInfo,
};
use common_services::api::upload::service::{
    Submission, delete_upload, get_upload, get_upload_stats, list_uploads, open_download,
    submit_upload, update_upload,
};
use common_services::database::app_user::User;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, instrument};

/// Reads the guest upload form. Unknown fields are ignored.
async fn read_upload_form(
    mut multipart: Multipart,
) -> Result<(UploaderInfo, IncomingFile), UploadError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        UploadError::BadRequest(format!("invalid multipart body: {e}"))
    };

    let mut info = UploaderInfo::default();
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(ToOwned::to_owned);
                let data = field.bytes().await.map_err(bad_form)?;
                file = Some(IncomingFile { filename, data });
            }
            "uploader_name" => info.uploader_name = field.text().await.map_err(bad_form)?,
            "uploader_email" => info.uploader_email = field.text().await.map_err(bad_form)?,
            "uploader_phone" => info.uploader_phone = field.text().await.map_err(bad_form)?,
            "caption" => info.caption = field.text().await.map_err(bad_form)?,
            "message" => info.message = field.text().await.map_err(bad_form)?,
            other => debug!("Ignoring unknown upload form field '{other}'"),
        }
    }

    let file = file.ok_or_else(|| UploadError::BadRequest("no file provided".into()))?;
    Ok((info, file))
}

/// Upload a file to an album, as a guest.
///
/// No account is needed, the access code is enough. When a bearer token is
/// sent, the upload is attributed to that user.
#[utoipa::path(
    post,
    path = "/upload/{access_code}",
    tag = "Upload",
    params(AccessCodeParams),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File accepted.", body = UploadReceipt),
        (status = 400, description = "The album's upload rules rejected the file."),
        (status = 404, description = "No album with this access code."),
        (status = 429, description = "Too many uploads from this address."),
    )
)]
#[instrument(skip(context, user, multipart))]
pub async fn submit_upload_handler(
    State(context): State<ApiContext>,
    Extension(OptionalUser(user)): Extension<OptionalUser>,
    Path(params): Path<AccessCodeParams>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadReceipt>), UploadError> {
    let (info, file) = read_upload_form(multipart).await?;
    let receipt = submit_upload(
        &context.pool,
        &context.settings,
        context.blobs.as_ref(),
        &context.mailer,
        &params.access_code,
        Submission {
            uploader: user,
            info,
            file,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// List an album's uploads. Only moderators see pending and rejected files.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/uploads",
    tag = "Upload",
    params(AlbumIdParams, UploadListFilter),
    responses(
        (status = 200, description = "Uploads of the album.", body = Vec<UploadSummary>),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_uploads_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Query(filter): Query<UploadListFilter>,
) -> Result<Json<Vec<UploadSummary>>, UploadError> {
    let uploads = list_uploads(
        &context.pool,
        &context.settings,
        &params.album_id,
        &user,
        filter,
    )
    .await?;
    Ok(Json(uploads))
}

/// Upload totals and a per-file-type breakdown. Moderators only.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/uploads/stats",
    tag = "Upload",
    params(AlbumIdParams),
    responses(
        (status = 200, description = "Upload statistics.", body = UploadStatsResponse),
        (status = 403, description = "The user does not moderate this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_upload_stats_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<Json<UploadStatsResponse>, UploadError> {
    Ok(Json(
        get_upload_stats(&context.pool, &params.album_id, &user).await?,
    ))
}

/// Get one upload. Counts as a view.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/uploads/{upload_id}",
    tag = "Upload",
    params(AlbumUploadParams),
    responses(
        (status = 200, description = "The upload.", body = UploadDetailResponse),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
) -> Result<Json<UploadDetailResponse>, UploadError> {
    let upload = get_upload(
        &context.pool,
        &context.settings,
        &params.album_id,
        &params.upload_id,
        &user,
    )
    .await?;
    Ok(Json(upload))
}

/// Edit an upload's caption or message. Moderators only.
#[utoipa::path(
    put,
    path = "/albums/{album_id}/uploads/{upload_id}",
    tag = "Upload",
    params(AlbumUploadParams),
    request_body = UpdateUploadRequest,
    responses(
        (status = 200, description = "The updated upload.", body = UploadResponse),
        (status = 403, description = "The user does not moderate this album."),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn update_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
    Json(payload): Json<UpdateUploadRequest>,
) -> Result<Json<UploadResponse>, UploadError> {
    let upload = update_upload(
        &context.pool,
        &context.settings,
        &params.album_id,
        &params.upload_id,
        &user,
        payload,
    )
    .await?;
    Ok(Json(upload))
}

/// Delete an upload and its files. Moderators only.
#[utoipa::path(
    delete,
    path = "/albums/{album_id}/uploads/{upload_id}",
    tag = "Upload",
    params(AlbumUploadParams),
    responses(
        (status = 204, description = "Upload deleted."),
        (status = 403, description = "The user does not moderate this album."),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn delete_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
) -> Result<StatusCode, UploadError> {
    delete_upload(
        &context.pool,
        context.blobs.as_ref(),
        &params.album_id,
        &params.upload_id,
        &user,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download the original file. Counts as a download on the upload and its album.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/uploads/{upload_id}/download",
    tag = "Upload",
    params(AlbumUploadParams),
    responses(
        (status = 200, description = "The original file.", content_type = "application/octet-stream"),
        (status = 404, description = "Upload not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn download_upload_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumUploadParams>,
) -> Result<Response, UploadError> {
    let (upload, file) = open_download(
        &context.pool,
        context.blobs.as_ref(),
        &params.album_id,
        &params.upload_id,
        &user,
    )
    .await?;

    let body = Body::from_stream(FramedRead::new(file, BytesCodec::new()));
    let disposition = format!(
        "attachment; filename=\"{}\"",
        upload.original_filename.replace('"', "")
    );
    let disposition_header = HeaderValue::from_str(&disposition)
        .unwrap_or(HeaderValue::from_static("attachment"));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, upload.mime_type.as_str())
        .header(header::CONTENT_DISPOSITION, disposition_header)
        .body(body)
        .map_err(|e| Report::new(e).wrap_err("Failed to build response"))?)
}
