use crate::api::album::service::media_url;
use crate::database::upload::{FileType, Upload, UploadStatus};
use app_state::AppSettings;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// --- Request Payloads ---

/// A file received from a multipart upload form.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Name as sent by the client, if any.
    pub filename: Option<String>,
    pub data: Bytes,
}

/// The optional text fields sent along with a guest upload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UploaderInfo {
    #[serde(default)]
    pub uploader_name: String,
    #[serde(default)]
    pub uploader_email: String,
    #[serde(default)]
    pub uploader_phone: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub message: String,
}

/// Documents the multipart body of `POST /upload/{access_code}`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub uploader_name: Option<String>,
    pub uploader_email: Option<String>,
    pub uploader_phone: Option<String>,
    pub caption: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUploadRequest {
    pub caption: Option<String>,
    pub message: Option<String>,
}

// --- URL/Path Parameters ---

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct AlbumUploadParams {
    pub album_id: String,
    pub upload_id: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct UploadIdParams {
    pub upload_id: String,
}

/// Filters for an album's upload listing.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadListFilter {
    pub status: Option<UploadStatus>,
    /// Matches filename, caption, message and uploader name.
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: UploadOrdering,
    pub limit: Option<i64>,
}

/// Sort order for upload listings. A leading `-` means descending.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, Default, ToSchema, PartialEq)]
pub enum UploadOrdering {
    #[serde(rename = "created_at")]
    CreatedAt,
    #[default]
    #[serde(rename = "-created_at")]
    CreatedAtDesc,
    #[serde(rename = "view_count")]
    ViewCount,
    #[serde(rename = "-view_count")]
    ViewCountDesc,
    #[serde(rename = "like_count")]
    LikeCount,
    #[serde(rename = "-like_count")]
    LikeCountDesc,
}

impl UploadOrdering {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at ASC, id",
            Self::CreatedAtDesc => "created_at DESC, id",
            Self::ViewCount => "view_count ASC, created_at DESC",
            Self::ViewCountDesc => "view_count DESC, created_at DESC",
            Self::LikeCount => "like_count ASC, created_at DESC",
            Self::LikeCountDesc => "like_count DESC, created_at DESC",
        }
    }
}

// --- Response Payloads ---

/// Compact view of an upload used in listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub id: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub uploader_name: String,
    pub caption: String,
    pub status: UploadStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UploadSummary {
    #[must_use]
    pub fn new(settings: &AppSettings, upload: &Upload) -> Self {
        Self {
            id: upload.id.clone(),
            original_filename: upload.original_filename.clone(),
            file_type: upload.file_type,
            file_size: upload.file_size,
            file_url: media_url(settings, &upload.file_path),
            thumbnail_url: upload
                .thumbnail_path
                .as_deref()
                .map(|p| media_url(settings, p)),
            uploader_name: upload.uploader_display_name().to_owned(),
            caption: upload.caption.clone(),
            status: upload.status,
            view_count: upload.view_count,
            like_count: upload.like_count,
            created_at: upload.created_at,
        }
    }
}

/// An upload with resolved media URLs.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(flatten)]
    pub upload: Upload,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
}

impl UploadResponse {
    #[must_use]
    pub fn new(settings: &AppSettings, upload: Upload) -> Self {
        Self {
            file_url: media_url(settings, &upload.file_path),
            thumbnail_url: upload
                .thumbnail_path
                .as_deref()
                .map(|p| media_url(settings, p)),
            upload,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDetailResponse {
    #[serde(flatten)]
    pub upload: UploadResponse,
    pub liked_by_me: bool,
    pub comment_count: i64,
}

/// Returned for an accepted guest submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub message: String,
    pub upload: UploadResponse,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadTotals {
    pub total_uploads: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_downloads: i64,
    pub total_size_bytes: i64,
    pub pending_uploads: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeCount {
    pub file_type: FileType,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatsResponse {
    #[serde(flatten)]
    pub totals: UploadTotals,
    pub total_size_mb: f64,
    pub file_type_breakdown: Vec<FileTypeCount>,
}
