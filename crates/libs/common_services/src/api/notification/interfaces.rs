use crate::database::notification::{
    DigestFrequency, EmailStatus, Notification, NotificationPreference, NotificationType,
};
use crate::database::notification_template::{NotificationTemplate, TemplateType};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;

// --- Request Payloads ---

/// Admin-issued notification to a single user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub recipient_id: i64,
    #[serde(default = "default_notification_type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Also email the recipient.
    #[serde(default)]
    pub send_email: bool,
}

const fn default_notification_type() -> NotificationType {
    NotificationType::System
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub email_new_upload: Option<bool>,
    pub email_new_comment: Option<bool>,
    pub app_new_upload: Option<bool>,
    pub app_new_comment: Option<bool>,
    pub digest_frequency: Option<DigestFrequency>,
}

impl UpdatePreferencesRequest {
    /// Applies the provided switches on top of `current`.
    #[must_use]
    pub fn apply(&self, mut current: NotificationPreference) -> NotificationPreference {
        if let Some(v) = self.email_new_upload {
            current.email_new_upload = v;
        }
        if let Some(v) = self.email_new_comment {
            current.email_new_comment = v;
        }
        if let Some(v) = self.app_new_upload {
            current.app_new_upload = v;
        }
        if let Some(v) = self.app_new_comment {
            current.app_new_comment = v;
        }
        if let Some(v) = self.digest_frequency {
            current.digest_frequency = v;
        }
        current
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    pub template_type: TemplateType,
    pub subject: String,
    pub html_content: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub available_variables: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub template_type: Option<TemplateType>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub available_variables: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl UpdateTemplateRequest {
    #[must_use]
    pub fn apply(self, mut current: NotificationTemplate) -> NotificationTemplate {
        if let Some(v) = self.name {
            current.name = v;
        }
        if let Some(v) = self.template_type {
            current.template_type = v;
        }
        if let Some(v) = self.subject {
            current.subject = v;
        }
        if let Some(v) = self.html_content {
            current.html_content = v;
        }
        if let Some(v) = self.text_content {
            current.text_content = v;
        }
        if let Some(v) = self.available_variables {
            current.available_variables.0 = v;
        }
        if let Some(v) = self.is_active {
            current.is_active = v;
        }
        current
    }
}

/// Renders a stored template by name and emails the result.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplateEmailRequest {
    pub template_name: String,
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: String,
    /// Placeholder values, nested by group: `{"album": {"title": "..."}}`.
    #[serde(default)]
    pub context: serde_json::Value,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
}

// --- URL/Path Parameters ---

#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListEmailsParams {
    pub status: Option<EmailStatus>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct NotificationIdParams {
    pub notification_id: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct EmailIdParams {
    pub email_id: String,
}

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Path)]
pub struct TemplateIdParams {
    pub template_id: i64,
}

/// Clamps a requested page size to `1..=MAX_LIST_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

// --- Response Payloads ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatsResponse {
    pub total_notifications: i64,
    pub unread_notifications: i64,
    pub recent_notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize, ToSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetryDueResponse {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}
