use crate::api::album::access::{AlbumAccess, find_visible_album};
use crate::api::album::interfaces::bytes_to_mb;
use crate::api::notification::email::EmailDispatcher;
use crate::api::notification::service::notify_new_upload;
use crate::api::upload::error::{PolicyViolation, UploadError};
use crate::api::upload::interfaces::{
    IncomingFile, UpdateUploadRequest, UploadDetailResponse, UploadListFilter, UploadReceipt,
    UploadResponse, UploadStatsResponse, UploadSummary, UploaderInfo,
};
use crate::api::upload::policy::{check_submission, check_uploader_quota};
use crate::blob_store::BlobStore;
use crate::database::album::album::Album;
use crate::database::album_store::AlbumStore;
use crate::database::app_user::User;
use crate::database::interaction_store::InteractionStore;
use crate::database::upload::{FileType, NewUpload, Upload, UploadStatus};
use crate::database::upload_store::UploadStore;
use crate::utils::{file_extension, nice_id};
use app_state::AppSettings;
use chrono::Utc;
use media_processing::{ImageMetadata, JpegThumbnail, generate_jpeg_thumbnail, read_image_metadata};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs::File;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A guest (or signed-in) submission to an album.
#[derive(Debug)]
pub struct Submission {
    pub uploader: Option<User>,
    pub info: UploaderInfo,
    pub file: IncomingFile,
}

/// What image processing produced for a stored file.
#[derive(Debug, Default)]
struct ProcessedImage {
    width: Option<i64>,
    height: Option<i64>,
    exif: BTreeMap<String, String>,
    thumbnail: Option<JpegThumbnail>,
}

fn process_image(path: PathBuf, max_side: u32, quality: u8) -> ProcessedImage {
    let metadata = match read_image_metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Could not read image metadata of {}: {e}", path.display());
            return ProcessedImage::default();
        }
    };
    let ImageMetadata {
        width,
        height,
        exif,
        orientation,
    } = metadata;

    let thumbnail = match generate_jpeg_thumbnail(&path, max_side, quality, orientation) {
        Ok(thumbnail) => Some(thumbnail),
        Err(e) => {
            warn!("Thumbnail generation failed for {}: {e}", path.display());
            None
        }
    };

    ProcessedImage {
        width: Some(i64::from(width)),
        height: Some(i64::from(height)),
        exif,
        thumbnail,
    }
}

/// Accepts a file into the album with the given access code.
///
/// The upload rules are checked before anything is stored. On success the blob,
/// an optional thumbnail and the upload row exist, and the album's view counter
/// went up in the same transaction as the insert. Owner notification is best
/// effort.
///
/// # Errors
///
/// * `UploadError::NotFound` for an unknown access code.
/// * `UploadError::Rejected` when a rule is violated.
#[instrument(skip(pool, settings, blobs, mailer, submission), fields(file_size = submission.file.data.len()))]
pub async fn submit_upload(
    pool: &SqlitePool,
    settings: &AppSettings,
    blobs: &dyn BlobStore,
    mailer: &EmailDispatcher,
    access_code: &str,
    submission: Submission,
) -> Result<UploadReceipt, UploadError> {
    let album = AlbumStore::find_by_access_code(pool, access_code)
        .await?
        .ok_or_else(|| UploadError::NotFound(format!("album {access_code}")))?;

    let Submission {
        uploader,
        info,
        file,
    } = submission;
    let file_size = i64::try_from(file.data.len()).unwrap_or(i64::MAX);
    let original_filename = file
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned);
    let extension = original_filename
        .as_deref()
        .map(file_extension)
        .unwrap_or_default();

    check_submission(&album, Utc::now(), file_size, &extension)?;
    if file_size == 0 {
        return Err(PolicyViolation::EmptyFile.into());
    }
    let uploader_user_id = uploader.as_ref().map(|u| u.id);
    let uploader_email = info.uploader_email.trim().to_owned();
    if uploader_user_id.is_some() || !uploader_email.is_empty() {
        let existing =
            UploadStore::count_for_uploader(pool, &album.id, uploader_user_id, &uploader_email)
                .await?;
        check_uploader_quota(&album, existing)?;
    }

    let stored_name = format!("{}.{extension}", Uuid::new_v4());
    let file_path = format!("uploads/{}/{stored_name}", album.access_code);
    blobs.put(&file_path, &file.data).await?;

    let upload_id = nice_id(settings.database.upload_id_length);
    let file_type = FileType::from_extension(&extension);
    let (processed, thumbnail_path) = if file_type == FileType::Image {
        store_image_derivatives(settings, blobs, &file_path, &upload_id).await
    } else {
        if file_type == FileType::Video {
            debug!("Video thumbnails are not generated, skipping {file_path}");
        }
        (ProcessedImage::default(), None)
    };

    let uploader_name = match (info.uploader_name.trim(), &uploader) {
        ("", Some(user)) => user.name.clone(),
        (name, _) => name.to_owned(),
    };
    let new_upload = NewUpload {
        id: upload_id,
        album_id: album.id.clone(),
        mime_type: mime_guess::from_path(&stored_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned(),
        original_filename: original_filename.unwrap_or_else(|| stored_name.clone()),
        file_path,
        file_type,
        file_size,
        thumbnail_path,
        width: processed.width,
        height: processed.height,
        uploader_name,
        uploader_email: if uploader_email.is_empty() {
            uploader.as_ref().map(|u| u.email.clone()).unwrap_or_default()
        } else {
            uploader_email
        },
        uploader_phone: info.uploader_phone.trim().to_owned(),
        uploader_user_id,
        caption: info.caption,
        message: info.message,
        exif_data: processed.exif,
        status: if album.require_approval {
            UploadStatus::Pending
        } else {
            UploadStatus::Approved
        },
    };

    let upload = match insert_upload(pool, &new_upload).await {
        Ok(upload) => upload,
        Err(e) => {
            for key in std::iter::once(&new_upload.file_path).chain(&new_upload.thumbnail_path) {
                if let Err(cleanup) = blobs.delete(key).await {
                    warn!("Could not remove orphaned blob {key}: {cleanup}");
                }
            }
            return Err(e);
        }
    };
    info!(
        "Accepted upload {} ({}, {} bytes) into album {}",
        upload.id, upload.file_type, upload.file_size, album.id
    );

    if let Err(e) = notify_new_upload(pool, settings, mailer, &album, &upload).await {
        warn!("Could not notify owner of album {} about upload {}: {e}", album.id, upload.id);
    }

    let message = if upload.status == UploadStatus::Pending {
        "File uploaded, it will appear once approved."
    } else {
        "File uploaded successfully!"
    };
    Ok(UploadReceipt {
        message: message.to_owned(),
        upload: UploadResponse::new(settings, upload),
    })
}

/// Inserts the row and bumps the album's view counter atomically.
async fn insert_upload(pool: &SqlitePool, new_upload: &NewUpload) -> Result<Upload, UploadError> {
    let mut tx = pool.begin().await?;
    let upload = UploadStore::insert(&mut *tx, new_upload, Utc::now()).await?;
    AlbumStore::increment_view_count(&mut *tx, &new_upload.album_id).await?;
    tx.commit().await?;
    Ok(upload)
}

/// Reads dimensions and EXIF, then stores a JPEG thumbnail. Every failure is
/// logged and leaves the corresponding field empty.
async fn store_image_derivatives(
    settings: &AppSettings,
    blobs: &dyn BlobStore,
    file_path: &str,
    upload_id: &str,
) -> (ProcessedImage, Option<String>) {
    let path = match blobs.local_path(file_path) {
        Ok(path) => path,
        Err(e) => {
            warn!("No local path for {file_path}: {e}");
            return (ProcessedImage::default(), None);
        }
    };
    let max_side = settings.thumbnails.max_side;
    let quality = settings.thumbnails.jpeg_quality;
    let mut processed =
        match tokio::task::spawn_blocking(move || process_image(path, max_side, quality)).await {
            Ok(processed) => processed,
            Err(e) => {
                warn!("Image processing task for {file_path} failed: {e}");
                return (ProcessedImage::default(), None);
            }
        };

    let Some(thumbnail) = processed.thumbnail.take() else {
        return (processed, None);
    };
    let thumbnail_path = format!("thumbnails/thumb_{upload_id}.jpg");
    match blobs.put(&thumbnail_path, &thumbnail.bytes).await {
        Ok(()) => (processed, Some(thumbnail_path)),
        Err(e) => {
            warn!("Could not store thumbnail {thumbnail_path}: {e}");
            (processed, None)
        }
    }
}

//================================================================================
// Album-scoped Upload Management
//================================================================================

async fn visible_album(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
) -> Result<(Album, AlbumAccess), UploadError> {
    find_visible_album(pool, album_id, user)
        .await?
        .ok_or_else(|| UploadError::NotFound(format!("album {album_id}")))
}

/// Loads an upload the user may see, together with its album.
pub async fn visible_upload(
    pool: &SqlitePool,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<(Album, AlbumAccess, Upload), UploadError> {
    let (album, access) = visible_album(pool, album_id, user).await?;
    let upload = UploadStore::find_in_album(pool, album_id, upload_id)
        .await?
        .filter(|upload| access.can_view_upload(&album, upload))
        .ok_or_else(|| UploadError::NotFound(format!("upload {upload_id}")))?;
    Ok((album, access, upload))
}

/// Lists an album's uploads. Only moderators see pending and rejected files.
#[instrument(skip(pool, settings, user), fields(user_id = user.id))]
pub async fn list_uploads(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    user: &User,
    mut filter: UploadListFilter,
) -> Result<Vec<UploadSummary>, UploadError> {
    let (_, access) = visible_album(pool, album_id, user).await?;
    if !access.can_moderate() {
        filter.status = Some(UploadStatus::Approved);
    }
    let uploads = UploadStore::list_for_album(pool, album_id, &filter).await?;
    Ok(uploads
        .iter()
        .map(|upload| UploadSummary::new(settings, upload))
        .collect())
}

/// Fetches one upload and counts the view.
#[instrument(skip(pool, settings, user), fields(user_id = user.id))]
pub async fn get_upload(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<UploadDetailResponse, UploadError> {
    let (_, access, _) = visible_upload(pool, album_id, upload_id, user).await?;
    UploadStore::increment_view_count(pool, upload_id).await?;

    let upload = UploadStore::find_in_album(pool, album_id, upload_id)
        .await?
        .ok_or_else(|| UploadError::NotFound(format!("upload {upload_id}")))?;
    let liked_by_me = InteractionStore::has_liked(pool, upload_id, user.id).await?;
    let comment_count = InteractionStore::list_comments(pool, upload_id, access.can_moderate())
        .await?
        .len();

    Ok(UploadDetailResponse {
        upload: UploadResponse::new(settings, upload),
        liked_by_me,
        comment_count: i64::try_from(comment_count).unwrap_or(i64::MAX),
    })
}

/// Edits caption and message. Moderators only.
#[instrument(skip(pool, settings, user, request), fields(user_id = user.id))]
pub async fn update_upload(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    upload_id: &str,
    user: &User,
    request: UpdateUploadRequest,
) -> Result<UploadResponse, UploadError> {
    let (_, access, _) = visible_upload(pool, album_id, upload_id, user).await?;
    if !access.can_moderate() {
        return Err(UploadError::Forbidden(format!(
            "user {} may not edit upload {upload_id}",
            user.id
        )));
    }
    let trimmed = |text: Option<String>| text.map(|t| t.trim().to_owned());
    let upload = UploadStore::update_text(
        pool,
        upload_id,
        trimmed(request.caption),
        trimmed(request.message),
        Utc::now(),
    )
    .await?;
    Ok(UploadResponse::new(settings, upload))
}

/// Deletes an upload and, best effort, its blobs. Moderators only.
#[instrument(skip(pool, blobs, user), fields(user_id = user.id))]
pub async fn delete_upload(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<(), UploadError> {
    let (_, access, upload) = visible_upload(pool, album_id, upload_id, user).await?;
    if !access.can_moderate() {
        return Err(UploadError::Forbidden(format!(
            "user {} may not delete upload {upload_id}",
            user.id
        )));
    }
    UploadStore::delete(pool, upload_id).await?;
    remove_upload_blobs(blobs, &upload).await;
    info!("Deleted upload {upload_id} from album {album_id}");
    Ok(())
}

/// Removes the file and thumbnail of a deleted upload. Failures are logged.
pub async fn remove_upload_blobs(blobs: &dyn BlobStore, upload: &Upload) {
    for key in std::iter::once(&upload.file_path).chain(&upload.thumbnail_path) {
        if let Err(e) = blobs.delete(key).await {
            warn!("Could not remove blob {key} of upload {}: {e}", upload.id);
        }
    }
}

/// Opens the stored file for download and counts the download on both the
/// upload and its album.
#[instrument(skip(pool, blobs, user), fields(user_id = user.id))]
pub async fn open_download(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    album_id: &str,
    upload_id: &str,
    user: &User,
) -> Result<(Upload, File), UploadError> {
    let (_, _, upload) = visible_upload(pool, album_id, upload_id, user).await?;
    let file = blobs.open(&upload.file_path).await?;

    let mut tx = pool.begin().await?;
    UploadStore::increment_download_count(&mut *tx, upload_id).await?;
    AlbumStore::increment_download_count(&mut *tx, album_id).await?;
    tx.commit().await?;

    Ok((upload, file))
}

#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn get_upload_stats(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
) -> Result<UploadStatsResponse, UploadError> {
    let (_, access) = visible_album(pool, album_id, user).await?;
    if !access.can_moderate() {
        return Err(UploadError::Forbidden(format!(
            "user {} may not see statistics of album {album_id}",
            user.id
        )));
    }
    let totals = UploadStore::totals(pool, album_id).await?;
    let file_type_breakdown = UploadStore::file_type_breakdown(pool, album_id).await?;
    Ok(UploadStatsResponse {
        total_size_mb: bytes_to_mb(totals.total_size_bytes),
        totals,
        file_type_breakdown,
    })
}
