use crate::database::DbError;
use crate::database::notification_template::{
    NewNotificationTemplate, NotificationTemplate, TemplateType,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

pub struct TemplateStore;

impl TemplateStore {
    pub async fn list(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> Result<Vec<NotificationTemplate>, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_template ORDER BY name",
        )
        .fetch_all(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        template_id: i64,
    ) -> Result<Option<NotificationTemplate>, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_template WHERE id = ?1",
        )
        .bind(template_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn find_by_name(
        executor: impl Executor<'_, Database = Sqlite>,
        name: &str,
    ) -> Result<Option<NotificationTemplate>, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_template WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?)
    }

    /// The active template used for an event, oldest first when several exist.
    pub async fn find_active_by_type(
        executor: impl Executor<'_, Database = Sqlite>,
        template_type: TemplateType,
    ) -> Result<Option<NotificationTemplate>, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            r"
            SELECT * FROM notification_template
            WHERE template_type = ?1 AND is_active
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(template_type)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn insert(
        executor: impl Executor<'_, Database = Sqlite>,
        template: &NewNotificationTemplate,
        now: DateTime<Utc>,
    ) -> Result<NotificationTemplate, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            r"
            INSERT INTO notification_template (
                name, template_type, subject, html_content, text_content, available_variables,
                is_active, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING *
            ",
        )
        .bind(&template.name)
        .bind(template.template_type)
        .bind(&template.subject)
        .bind(&template.html_content)
        .bind(&template.text_content)
        .bind(Json(&template.available_variables))
        .bind(template.is_active)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    /// Overwrites every editable column of a template.
    pub async fn update(
        executor: impl Executor<'_, Database = Sqlite>,
        template: &NotificationTemplate,
        now: DateTime<Utc>,
    ) -> Result<Option<NotificationTemplate>, DbError> {
        Ok(sqlx::query_as::<_, NotificationTemplate>(
            r"
            UPDATE notification_template
            SET name = ?1, template_type = ?2, subject = ?3, html_content = ?4,
                text_content = ?5, available_variables = ?6, is_active = ?7, updated_at = ?8
            WHERE id = ?9
            RETURNING *
            ",
        )
        .bind(&template.name)
        .bind(template.template_type)
        .bind(&template.subject)
        .bind(&template.html_content)
        .bind(&template.text_content)
        .bind(&template.available_variables)
        .bind(template.is_active)
        .bind(now)
        .bind(template.id)
        .fetch_optional(executor)
        .await?)
    }

    /// Returns whether a row was removed.
    pub async fn delete(
        executor: impl Executor<'_, Database = Sqlite>,
        template_id: i64,
    ) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM notification_template WHERE id = ?1")
            .bind(template_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
