use crate::api::album::access::{AlbumAccess, find_visible_album};
use crate::api::interaction::error::InteractionError;
use crate::api::interaction::interfaces::{
    BulkAction, BulkModerateRequest, BulkModerateResponse, CreateCommentRequest,
    CreateReportRequest, MAX_COMMENT_LENGTH, ModerateUploadRequest, ToggleLikeResponse,
};
use crate::api::notification::email::EmailDispatcher;
use crate::api::notification::service::notify_new_comment;
use crate::api::upload::service::remove_upload_blobs;
use crate::blob_store::BlobStore;
use crate::database::album::album::Album;
use crate::database::app_user::User;
use crate::database::interaction::{UploadComment, UploadReport};
use crate::database::interaction_store::InteractionStore;
use crate::database::upload::{Upload, UploadStatus};
use crate::database::upload_store::UploadStore;
use crate::database::DbError;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

/// Loads an upload the user may see, with its album and the user's access.
async fn visible_upload(
    pool: &SqlitePool,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<(Album, AlbumAccess, Upload), InteractionError> {
    let (album, access) = find_visible_album(pool, album_id, user)
        .await?
        .ok_or_else(|| InteractionError::NotFound(format!("album {album_id}")))?;
    let upload = UploadStore::find_in_album(pool, album_id, upload_id)
        .await?
        .filter(|upload| access.can_view_upload(&album, upload))
        .ok_or_else(|| InteractionError::NotFound(format!("upload {upload_id}")))?;
    Ok((album, access, upload))
}

/// Loads an album the user moderates. Albums the user cannot see are reported
/// as missing.
async fn moderated_album(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
) -> Result<Album, InteractionError> {
    let (album, access) = find_visible_album(pool, album_id, user)
        .await?
        .ok_or_else(|| InteractionError::NotFound(format!("album {album_id}")))?;
    if !access.can_moderate() {
        return Err(InteractionError::Forbidden(format!(
            "user {} does not moderate album {album_id}",
            user.id
        )));
    }
    Ok(album)
}

//================================================================================
// Likes
//================================================================================

/// Likes the upload, or removes the like when it already exists.
#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn toggle_like(
    pool: &SqlitePool,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<ToggleLikeResponse, InteractionError> {
    visible_upload(pool, album_id, upload_id, user).await?;

    let mut tx = pool.begin().await?;
    let removed = InteractionStore::delete_like(&mut *tx, upload_id, user.id).await?;
    let (liked, delta) = if removed {
        (false, -1)
    } else {
        InteractionStore::insert_like(&mut *tx, upload_id, user.id, Utc::now()).await?;
        (true, 1)
    };
    let like_count = UploadStore::adjust_like_count(&mut *tx, upload_id, delta).await?;
    tx.commit().await?;

    Ok(ToggleLikeResponse { liked, like_count })
}

//================================================================================
// Comments
//================================================================================

#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn list_comments(
    pool: &SqlitePool,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<Vec<UploadComment>, InteractionError> {
    let (_, access, _) = visible_upload(pool, album_id, upload_id, user).await?;
    Ok(InteractionStore::list_comments(pool, upload_id, access.can_moderate()).await?)
}

/// Adds a comment, or a reply when `parent_id` names a comment on the same
/// upload. The uploader is notified best effort.
#[instrument(skip(pool, mailer, user, request), fields(user_id = user.id))]
pub async fn add_comment(
    pool: &SqlitePool,
    mailer: &EmailDispatcher,
    album_id: &str,
    upload_id: &str,
    user: &User,
    request: CreateCommentRequest,
) -> Result<UploadComment, InteractionError> {
    let (album, _, upload) = visible_upload(pool, album_id, upload_id, user).await?;
    if !album.enable_comments {
        return Err(InteractionError::Forbidden(format!(
            "comments are disabled in album {album_id}"
        )));
    }

    let content = request.content.trim();
    if content.is_empty() {
        return Err(InteractionError::BadRequest("comment cannot be empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(InteractionError::BadRequest(format!(
            "comment exceeds {MAX_COMMENT_LENGTH} characters"
        )));
    }
    if let Some(parent_id) = request.parent_id {
        let parent = InteractionStore::find_comment(pool, parent_id).await?;
        if parent.is_none_or(|p| p.upload_id != upload_id) {
            return Err(InteractionError::BadRequest(format!(
                "comment {parent_id} is not on upload {upload_id}"
            )));
        }
    }

    let comment_id = InteractionStore::insert_comment(
        pool,
        upload_id,
        user.id,
        content,
        request.parent_id,
        Utc::now(),
    )
    .await?;
    let comment = InteractionStore::find_comment(pool, comment_id)
        .await?
        .ok_or_else(|| InteractionError::NotFound(format!("comment {comment_id}")))?;

    if let Err(e) = notify_new_comment(pool, mailer, &album, &upload, &comment).await {
        warn!("Could not notify about comment {}: {e}", comment.id);
    }
    Ok(comment)
}

//================================================================================
// Reports
//================================================================================

/// Files a report. A user can report an upload only once.
#[instrument(skip(pool, user, request), fields(user_id = user.id))]
pub async fn report_upload(
    pool: &SqlitePool,
    album_id: &str,
    upload_id: &str,
    user: &User,
    request: &CreateReportRequest,
) -> Result<UploadReport, InteractionError> {
    visible_upload(pool, album_id, upload_id, user).await?;
    match InteractionStore::insert_report(
        pool,
        upload_id,
        user.id,
        request.reason,
        request.description.trim(),
        Utc::now(),
    )
    .await
    {
        Ok(report) => Ok(report),
        Err(DbError::UniqueViolation { .. }) => Err(InteractionError::Conflict(format!(
            "upload {upload_id} was already reported by this user"
        ))),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn list_reports(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
    include_resolved: bool,
) -> Result<Vec<UploadReport>, InteractionError> {
    moderated_album(pool, album_id, user).await?;
    Ok(InteractionStore::list_reports_for_album(pool, album_id, include_resolved).await?)
}

/// Marks a report resolved. Resolving twice keeps the first resolution.
#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn resolve_report(
    pool: &SqlitePool,
    report_id: i64,
    user: &User,
) -> Result<UploadReport, InteractionError> {
    let not_found = || InteractionError::NotFound(format!("report {report_id}"));
    let report = InteractionStore::find_report(pool, report_id)
        .await?
        .ok_or_else(not_found)?;
    let upload = UploadStore::find_by_id(pool, &report.upload_id)
        .await?
        .ok_or_else(not_found)?;
    moderated_album(pool, &upload.album_id, user)
        .await
        .map_err(|e| match e {
            InteractionError::NotFound(_) => not_found(),
            other => other,
        })?;

    if report.is_resolved {
        return Ok(report);
    }
    let report = InteractionStore::resolve_report(pool, report_id, user.id, Utc::now()).await?;
    info!("Report {report_id} resolved by user {}", user.id);
    Ok(report)
}

//================================================================================
// Moderation
//================================================================================

fn ensure_moderation_target(status: UploadStatus) -> Result<(), InteractionError> {
    match status {
        UploadStatus::Approved | UploadStatus::Rejected => Ok(()),
        other => Err(InteractionError::BadRequest(format!(
            "uploads can only be moderated to approved or rejected, not {other}"
        ))),
    }
}

/// Approves or rejects a single upload.
#[instrument(skip(pool, user, request), fields(user_id = user.id))]
pub async fn moderate_upload(
    pool: &SqlitePool,
    upload_id: &str,
    user: &User,
    request: &ModerateUploadRequest,
) -> Result<Upload, InteractionError> {
    ensure_moderation_target(request.status)?;
    let not_found = || InteractionError::NotFound(format!("upload {upload_id}"));
    let upload = UploadStore::find_by_id(pool, upload_id)
        .await?
        .ok_or_else(not_found)?;
    moderated_album(pool, &upload.album_id, user)
        .await
        .map_err(|e| match e {
            InteractionError::NotFound(_) => not_found(),
            other => other,
        })?;

    let upload = UploadStore::set_moderation(
        pool,
        upload_id,
        request.status,
        request.moderation_note.trim(),
        user.id,
        Utc::now(),
    )
    .await?;
    info!("Upload {upload_id} is now {}", upload.status);
    Ok(upload)
}

/// Applies one action to many uploads of an album. Ids from other albums are
/// ignored. Deletion also removes the blobs, best effort.
#[instrument(skip(pool, blobs, user, request), fields(user_id = user.id, count = request.upload_ids.len()))]
pub async fn bulk_moderate(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    album_id: &str,
    user: &User,
    request: BulkModerateRequest,
) -> Result<BulkModerateResponse, InteractionError> {
    moderated_album(pool, album_id, user).await?;

    let mut upload_ids: Vec<String> = Vec::with_capacity(request.upload_ids.len());
    for id in request.upload_ids {
        if !upload_ids.contains(&id) {
            upload_ids.push(id);
        }
    }
    if upload_ids.is_empty() {
        return Err(InteractionError::BadRequest("no upload ids given".into()));
    }

    let now = Utc::now();
    let affected = match request.action {
        BulkAction::Approve => {
            UploadStore::bulk_set_status(
                pool,
                album_id,
                &upload_ids,
                UploadStatus::Approved,
                user.id,
                now,
            )
            .await?
        }
        BulkAction::Reject => {
            UploadStore::bulk_set_status(
                pool,
                album_id,
                &upload_ids,
                UploadStatus::Rejected,
                user.id,
                now,
            )
            .await?
        }
        BulkAction::Delete => {
            let doomed = UploadStore::find_many_in_album(pool, album_id, &upload_ids).await?;
            let deleted = UploadStore::bulk_delete(pool, album_id, &upload_ids).await?;
            for upload in &doomed {
                remove_upload_blobs(blobs, upload).await;
            }
            deleted
        }
    };

    info!(
        "Bulk {:?} on album {album_id} affected {affected} uploads",
        request.action
    );
    Ok(BulkModerateResponse {
        action: request.action,
        affected,
    })
}

