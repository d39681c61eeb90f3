use crate::api::upload::interfaces::UploadSummary;
use crate::database::album::album::{Album, AlbumPrivacy, AlbumStatus};
use crate::database::album::album_collaborator::{AlbumCollaborator, CollaboratorRole};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// --- Request Payloads ---

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub status: Option<AlbumStatus>,
    pub privacy: Option<AlbumPrivacy>,
    /// Required when `privacy` is `password_protected`.
    #[schema(value_type = Option<String>, format = "password")]
    pub password: Option<String>,
    pub max_files_per_user: Option<u32>,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size_mb: Option<u32>,
    pub require_approval: Option<bool>,
    pub enable_comments: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub privacy: Option<AlbumPrivacy>,
    #[schema(value_type = Option<String>, format = "password")]
    pub password: Option<String>,
    pub max_files_per_user: Option<u32>,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size_mb: Option<u32>,
    pub require_approval: Option<bool>,
    pub enable_comments: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumStatusRequest {
    pub status: AlbumStatus,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddCollaboratorRequest {
    pub user_email: String,
    pub role: CollaboratorRole,
}

// --- URL/Path Parameters ---

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct AlbumIdParams {
    pub album_id: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct AccessCodeParams {
    pub access_code: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct RemoveCollaboratorParams {
    pub album_id: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListAlbumsParams {
    /// Matches title, description and location.
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: AlbumOrdering,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
pub struct PublicAlbumParams {
    /// Needed for password protected albums.
    pub password: Option<String>,
}

/// Sort order for album listings. A leading `-` means descending.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, Default, ToSchema, PartialEq)]
pub enum AlbumOrdering {
    #[serde(rename = "created_at")]
    CreatedAt,
    #[default]
    #[serde(rename = "-created_at")]
    CreatedAtDesc,
    #[serde(rename = "event_date")]
    EventDate,
    #[serde(rename = "-event_date")]
    EventDateDesc,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "-title")]
    TitleDesc,
}

impl AlbumOrdering {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::CreatedAt => "a.created_at ASC, a.id",
            Self::CreatedAtDesc => "a.created_at DESC, a.id",
            Self::EventDate => "a.event_date ASC, a.id",
            Self::EventDateDesc => "a.event_date DESC, a.id",
            Self::Title => "a.title COLLATE NOCASE ASC, a.id",
            Self::TitleDesc => "a.title COLLATE NOCASE DESC, a.id",
        }
    }
}

// --- Response Payloads ---

/// An album as seen by one of its members.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    #[serde(flatten)]
    pub album: Album,
    pub upload_url: String,
    pub qr_code_url: Option<String>,
    pub is_password_protected: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumListItem {
    #[serde(flatten)]
    pub album: Album,
    pub upload_url: String,
    pub total_uploads: i64,
    pub total_size_mb: f64,
}

/// Full details of an album, including collaborators.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetailsResponse {
    #[serde(flatten)]
    pub album: AlbumResponse,
    pub total_uploads: i64,
    pub total_size_mb: f64,
    pub collaborators: Vec<AlbumCollaborator>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumQrCodeResponse {
    pub id: String,
    pub title: String,
    pub access_code: String,
    pub upload_url: String,
    pub qr_code_path: String,
    pub qr_code_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumStatsResponse {
    pub id: String,
    pub title: String,
    pub total_uploads: i64,
    pub pending_uploads: i64,
    pub total_size_mb: f64,
    pub view_count: i64,
    pub download_count: i64,
    pub recent_uploads: Vec<UploadSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAlbumStats {
    pub total_albums: i64,
    pub active_albums: i64,
    pub total_uploads: i64,
}

/// What an anonymous visitor sees when opening an album by access code.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicAlbumResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: String,
    pub status: AlbumStatus,
    pub access_code: String,
    pub upload_url: String,
    pub accepting_uploads: bool,
    pub allowed_file_types: Vec<String>,
    pub max_file_size_mb: i64,
    pub max_files_per_user: i64,
    pub enable_comments: bool,
    pub uploads: Vec<UploadSummary>,
}

#[must_use]
pub fn bytes_to_mb(bytes: i64) -> f64 {
    (bytes as f64 / 1_048_576.0 * 100.0).round() / 100.0
}
