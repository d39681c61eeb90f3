use crate::database::interaction::ReportReason;
use crate::database::upload::UploadStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const MAX_COMMENT_LENGTH: usize = 2000;

// --- Request Payloads ---

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    /// Comment being replied to, on the same upload.
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub reason: ReportReason,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerateUploadRequest {
    /// `approved` or `rejected`.
    pub status: UploadStatus,
    #[serde(default)]
    pub moderation_note: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
    Delete,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkModerateRequest {
    pub upload_ids: Vec<String>,
    pub action: BulkAction,
}

// --- URL/Path Parameters ---

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct ReportIdParams {
    pub report_id: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsParams {
    #[serde(default)]
    pub include_resolved: bool,
}

// --- Response Payloads ---

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkModerateResponse {
    pub action: BulkAction,
    pub affected: u64,
}
