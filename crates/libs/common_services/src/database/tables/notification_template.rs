use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    NewUpload,
    NewComment,
    AlbumCreated,
    AlbumShared,
    UploadApproved,
    UploadRejected,
    Welcome,
    PasswordReset,
}

/// An admin-editable email template. Subject and bodies may contain
/// `{{ group.field }}` placeholders.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub id: i64,
    pub name: String,
    pub template_type: TemplateType,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    #[schema(value_type = Vec<String>)]
    pub available_variables: Json<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotificationTemplate {
    pub name: String,
    pub template_type: TemplateType,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    pub available_variables: Vec<String>,
    pub is_active: bool,
}
