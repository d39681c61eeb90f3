use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;

/// Exponent cap for retry backoff, keeps the delay representable.
const MAX_BACKOFF_EXPONENT: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Upload,
    Comment,
    Like,
    AlbumShared,
    System,
}

/// An in-app notification.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
    #[schema(value_type = Object)]
    pub data: Json<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
    Delivered,
    Bounced,
}

/// An outbound email and its delivery state.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotification {
    pub id: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub recipient_user_id: Option<i64>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
    /// Stored template the body was rendered from, if any.
    pub template_id: Option<i64>,
    pub status: EmailStatus,
    pub error_message: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailNotification {
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.status == EmailStatus::Failed && self.retry_count < self.max_retries
    }

    /// Whether a retry is allowed and its backoff has elapsed.
    #[must_use]
    pub fn is_retry_due(&self, now: DateTime<Utc>) -> bool {
        self.can_retry() && self.next_retry_at.is_none_or(|at| at <= now)
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.status = EmailStatus::Sent;
        self.sent_at = Some(now);
        self.updated_at = now;
    }

    /// Records a failed delivery attempt. When another attempt is allowed,
    /// schedules it `2^retry_count` minutes from `now`.
    pub fn mark_failed(&mut self, error_message: &str, now: DateTime<Utc>) {
        self.status = EmailStatus::Failed;
        self.error_message = error_message.to_owned();
        self.retry_count = self.retry_count.saturating_add(1);
        if self.can_retry() {
            self.next_retry_at = Some(now + retry_backoff(self.retry_count));
        }
        self.updated_at = now;
    }
}

/// Wait before the next attempt: `2^retry_count` minutes.
#[must_use]
pub fn retry_backoff(retry_count: i32) -> Duration {
    let exponent = u32::try_from(retry_count)
        .unwrap_or(0)
        .min(MAX_BACKOFF_EXPONENT);
    Duration::minutes(1_i64 << exponent)
}

#[derive(Debug, Clone)]
pub struct NewEmailNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub recipient_user_id: Option<i64>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    pub album_id: Option<String>,
    pub upload_id: Option<String>,
    pub template_id: Option<i64>,
    pub max_retries: i32,
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DigestFrequency {
    #[default]
    Immediate,
    Daily,
    Weekly,
    Never,
}

/// Per-user notification switches. A user without a stored row gets `defaults_for`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub user_id: i64,
    pub email_new_upload: bool,
    pub email_new_comment: bool,
    pub app_new_upload: bool,
    pub app_new_comment: bool,
    pub digest_frequency: DigestFrequency,
}

impl NotificationPreference {
    #[must_use]
    pub const fn defaults_for(user_id: i64) -> Self {
        Self {
            user_id,
            email_new_upload: true,
            email_new_comment: true,
            app_new_upload: true,
            app_new_comment: true,
            digest_frequency: DigestFrequency::Immediate,
        }
    }
}
