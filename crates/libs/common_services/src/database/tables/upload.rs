use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq, Hash)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl FileType {
    /// Classifies a normalized (lowercase, no dot) extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tiff" => Self::Image,
            "mp4" | "mov" | "avi" | "mkv" | "wmv" | "flv" | "webm" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" => Self::Audio,
            "pdf" | "doc" | "docx" | "txt" | "rtf" => Self::Document,
            _ => Self::Other,
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Approved,
    Rejected,
    Processing,
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
        };
        f.write_str(s)
    }
}

/// A file submitted to an album, by a guest or a registered user.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: String,
    pub album_id: String,
    pub file_path: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub mime_type: String,
    pub thumbnail_path: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration: Option<f64>,
    pub uploader_name: String,
    pub uploader_email: String,
    pub uploader_phone: String,
    pub uploader_user_id: Option<i64>,
    pub caption: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub exif_data: Json<BTreeMap<String, String>>,
    pub status: UploadStatus,
    pub moderation_note: String,
    pub moderated_by: Option<i64>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Upload {
    /// Name shown for the uploader, falling back to "Anonymous".
    #[must_use]
    pub fn uploader_display_name(&self) -> &str {
        if self.uploader_name.trim().is_empty() {
            "Anonymous"
        } else {
            &self.uploader_name
        }
    }
}

/// Everything needed to insert a new upload row.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub id: String,
    pub album_id: String,
    pub file_path: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub mime_type: String,
    pub thumbnail_path: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub uploader_name: String,
    pub uploader_email: String,
    pub uploader_phone: String,
    pub uploader_user_id: Option<i64>,
    pub caption: String,
    pub message: String,
    pub exif_data: BTreeMap<String, String>,
    pub status: UploadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(FileType::from_extension("jpeg"), FileType::Image);
        assert_eq!(FileType::from_extension("tiff"), FileType::Image);
        assert_eq!(FileType::from_extension("webm"), FileType::Video);
        assert_eq!(FileType::from_extension("m4a"), FileType::Audio);
        assert_eq!(FileType::from_extension("docx"), FileType::Document);
    }

    #[test]
    fn unknown_extensions_are_other() {
        assert_eq!(FileType::from_extension("zip"), FileType::Other);
        assert_eq!(FileType::from_extension(""), FileType::Other);
    }
}
