use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A comment on an upload, joined with its author's name.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadComment {
    pub id: i64,
    pub upload_id: String,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
    pub parent_id: Option<i64>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Inappropriate,
    Spam,
    Copyright,
    Harassment,
    Other,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub id: i64,
    pub upload_id: String,
    pub reporter_id: i64,
    pub reason: ReportReason,
    pub description: String,
    pub is_resolved: bool,
    pub resolved_by: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
