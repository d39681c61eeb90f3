use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlbumStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Archived,
}

impl Display for AlbumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlbumPrivacy {
    #[default]
    Public,
    Private,
    PasswordProtected,
}

/// Represents a single album in the database.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: String,
    pub owner_id: i64,
    pub status: AlbumStatus,
    pub privacy: AlbumPrivacy,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub access_code: String,
    pub qr_code_path: Option<String>,
    pub max_files_per_user: i64,
    #[schema(value_type = Vec<String>)]
    pub allowed_file_types: Json<Vec<String>>,
    pub max_file_size_mb: i64,
    pub require_approval: bool,
    pub enable_comments: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Album {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Upper bound for a single upload, in bytes.
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> i64 {
        self.max_file_size_mb.saturating_mul(1_048_576)
    }

    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_file_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

/// Everything needed to insert a new album row, apart from its access code.
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub id: String,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: String,
    pub status: AlbumStatus,
    pub privacy: AlbumPrivacy,
    pub password_hash: Option<String>,
    pub max_files_per_user: i64,
    pub allowed_file_types: Vec<String>,
    pub max_file_size_mb: i64,
    pub require_approval: bool,
    pub enable_comments: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Column changes for an album. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct AlbumChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type_id: Option<i64>,
    pub event_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub privacy: Option<AlbumPrivacy>,
    pub password_hash: Option<String>,
    pub max_files_per_user: Option<i64>,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size_mb: Option<i64>,
    pub require_approval: Option<bool>,
    pub enable_comments: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// An album with aggregate upload figures, used in listings.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub album: Album,
    pub total_uploads: i64,
    pub total_size_bytes: i64,
}
