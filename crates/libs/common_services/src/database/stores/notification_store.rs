use crate::database::DbError;
use crate::database::notification::{
    EmailNotification, EmailStatus, NewEmailNotification, NewNotification, Notification,
    NotificationPreference,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

pub struct NotificationStore;

impl NotificationStore {
    //================================================================================
    // In-app Notifications
    //================================================================================

    pub async fn insert(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
        notification: &NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, DbError> {
        Ok(sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notification (
                id, recipient_id, notification_type, title, message, album_id, upload_id, data, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING *
            ",
        )
        .bind(id)
        .bind(notification.recipient_id)
        .bind(notification.notification_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.album_id)
        .bind(&notification.upload_id)
        .bind(Json(&notification.data))
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    /// Lists a user's notifications, newest first.
    pub async fn list_for_recipient(
        executor: impl Executor<'_, Database = Sqlite>,
        recipient_id: i64,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, DbError> {
        Ok(sqlx::query_as::<_, Notification>(
            r"
            SELECT * FROM notification
            WHERE recipient_id = ?1 AND (NOT ?2 OR NOT is_read)
            ORDER BY created_at DESC, id
            LIMIT ?3
            ",
        )
        .bind(recipient_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(executor)
        .await?)
    }

    pub async fn find_for_recipient(
        executor: impl Executor<'_, Database = Sqlite>,
        notification_id: &str,
        recipient_id: i64,
    ) -> Result<Option<Notification>, DbError> {
        Ok(sqlx::query_as::<_, Notification>(
            "SELECT * FROM notification WHERE id = ?1 AND recipient_id = ?2",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Marks one notification as read. `read_at` keeps its first value.
    pub async fn mark_read(
        executor: impl Executor<'_, Database = Sqlite>,
        notification_id: &str,
        recipient_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, DbError> {
        Ok(sqlx::query_as::<_, Notification>(
            r"
            UPDATE notification
            SET is_read = 1, read_at = COALESCE(read_at, ?1)
            WHERE id = ?2 AND recipient_id = ?3
            RETURNING *
            ",
        )
        .bind(now)
        .bind(notification_id)
        .bind(recipient_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Marks all unread notifications of a user as read. Returns how many changed.
    pub async fn mark_all_read(
        executor: impl Executor<'_, Database = Sqlite>,
        recipient_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE notification SET is_read = 1, read_at = ?1 WHERE recipient_id = ?2 AND NOT is_read",
        )
        .bind(now)
        .bind(recipient_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Returns `(total, unread)` for a user.
    pub async fn counts_for_recipient(
        executor: impl Executor<'_, Database = Sqlite>,
        recipient_id: i64,
    ) -> Result<(i64, i64), DbError> {
        Ok(sqlx::query_as::<_, (i64, i64)>(
            r"
            SELECT COUNT(*), COALESCE(SUM(NOT is_read), 0)
            FROM notification
            WHERE recipient_id = ?1
            ",
        )
        .bind(recipient_id)
        .fetch_one(executor)
        .await?)
    }

    //================================================================================
    // Email Notifications
    //================================================================================

    /// Queues an email as pending.
    pub async fn insert_email(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
        email: &NewEmailNotification,
        now: DateTime<Utc>,
    ) -> Result<EmailNotification, DbError> {
        Ok(sqlx::query_as::<_, EmailNotification>(
            r"
            INSERT INTO email_notification (
                id, recipient_email, recipient_name, recipient_user_id, subject, html_content,
                text_content, album_id, upload_id, template_id, status, max_retries, created_at,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&email.recipient_email)
        .bind(&email.recipient_name)
        .bind(email.recipient_user_id)
        .bind(&email.subject)
        .bind(&email.html_content)
        .bind(&email.text_content)
        .bind(&email.album_id)
        .bind(&email.upload_id)
        .bind(email.template_id)
        .bind(EmailStatus::Pending)
        .bind(email.max_retries)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_email(
        executor: impl Executor<'_, Database = Sqlite>,
        email_id: &str,
    ) -> Result<Option<EmailNotification>, DbError> {
        Ok(
            sqlx::query_as::<_, EmailNotification>(
                "SELECT * FROM email_notification WHERE id = ?1",
            )
            .bind(email_id)
            .fetch_optional(executor)
            .await?,
        )
    }

    /// Lists emails, newest first, optionally restricted to one status.
    pub async fn list_emails(
        executor: impl Executor<'_, Database = Sqlite>,
        status: Option<EmailStatus>,
        limit: i64,
    ) -> Result<Vec<EmailNotification>, DbError> {
        Ok(sqlx::query_as::<_, EmailNotification>(
            r"
            SELECT * FROM email_notification
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY created_at DESC, id
            LIMIT ?2
            ",
        )
        .bind(status)
        .bind(limit)
        .fetch_all(executor)
        .await?)
    }

    /// Failed emails that still have attempts left, oldest first.
    pub async fn list_retryable_emails(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> Result<Vec<EmailNotification>, DbError> {
        Ok(sqlx::query_as::<_, EmailNotification>(
            r"
            SELECT * FROM email_notification
            WHERE status = 'failed' AND retry_count < max_retries
            ORDER BY created_at, id
            ",
        )
        .fetch_all(executor)
        .await?)
    }

    /// Persists the delivery state of an email.
    pub async fn save_delivery_state(
        executor: impl Executor<'_, Database = Sqlite>,
        email: &EmailNotification,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"
            UPDATE email_notification
            SET status = ?1, error_message = ?2, sent_at = ?3, retry_count = ?4,
                next_retry_at = ?5, updated_at = ?6
            WHERE id = ?7
            ",
        )
        .bind(email.status)
        .bind(&email.error_message)
        .bind(email.sent_at)
        .bind(email.retry_count)
        .bind(email.next_retry_at)
        .bind(email.updated_at)
        .bind(&email.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    //================================================================================
    // Preferences
    //================================================================================

    pub async fn find_preference(
        executor: impl Executor<'_, Database = Sqlite>,
        user_id: i64,
    ) -> Result<Option<NotificationPreference>, DbError> {
        Ok(sqlx::query_as::<_, NotificationPreference>(
            r"
            SELECT user_id, email_new_upload, email_new_comment, app_new_upload, app_new_comment,
                   digest_frequency
            FROM notification_preference
            WHERE user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn upsert_preference(
        executor: impl Executor<'_, Database = Sqlite>,
        preference: &NotificationPreference,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO notification_preference (
                user_id, email_new_upload, email_new_comment, app_new_upload, app_new_comment,
                digest_frequency, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (user_id) DO UPDATE SET
                email_new_upload = excluded.email_new_upload,
                email_new_comment = excluded.email_new_comment,
                app_new_upload = excluded.app_new_upload,
                app_new_comment = excluded.app_new_comment,
                digest_frequency = excluded.digest_frequency,
                updated_at = excluded.updated_at
            ",
        )
        .bind(preference.user_id)
        .bind(preference.email_new_upload)
        .bind(preference.email_new_comment)
        .bind(preference.app_new_upload)
        .bind(preference.app_new_comment)
        .bind(preference.digest_frequency)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }
}
