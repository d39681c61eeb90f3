use crate::database::DbError;
use crate::database::interaction::{ReportReason, UploadComment, UploadReport};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

const COMMENT_COLUMNS: &str = r"
    c.id, c.upload_id, c.author_id, u.name AS author_name, c.content, c.parent_id,
    c.is_approved, c.created_at, c.updated_at
";

pub struct InteractionStore;

impl InteractionStore {
    //================================================================================
    // Likes
    //================================================================================

    /// Removes a user's like. Returns whether a like existed.
    pub async fn delete_like(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        user_id: i64,
    ) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM upload_like WHERE upload_id = ?1 AND user_id = ?2")
            .bind(upload_id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_like(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO upload_like (upload_id, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(upload_id)
            .bind(user_id)
            .bind(now)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn has_liked(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        user_id: i64,
    ) -> Result<bool, DbError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM upload_like WHERE upload_id = ?1 AND user_id = ?2)",
        )
        .bind(upload_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?)
    }

    //================================================================================
    // Comments
    //================================================================================

    pub async fn insert_comment(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        author_id: i64,
        content: &str,
        parent_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO upload_comment (upload_id, author_id, content, parent_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            ",
        )
        .bind(upload_id)
        .bind(author_id)
        .bind(content)
        .bind(parent_id)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_comment(
        executor: impl Executor<'_, Database = Sqlite>,
        comment_id: i64,
    ) -> Result<Option<UploadComment>, DbError> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM upload_comment c JOIN app_user u ON u.id = c.author_id WHERE c.id = ?1"
        );
        Ok(sqlx::query_as::<_, UploadComment>(&query)
            .bind(comment_id)
            .fetch_optional(executor)
            .await?)
    }

    /// Lists comments on an upload, oldest first.
    pub async fn list_comments(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        include_unapproved: bool,
    ) -> Result<Vec<UploadComment>, DbError> {
        let query = format!(
            r"
            SELECT {COMMENT_COLUMNS}
            FROM upload_comment c
            JOIN app_user u ON u.id = c.author_id
            WHERE c.upload_id = ?1 AND (?2 OR c.is_approved)
            ORDER BY c.created_at, c.id
            "
        );
        Ok(sqlx::query_as::<_, UploadComment>(&query)
            .bind(upload_id)
            .bind(include_unapproved)
            .fetch_all(executor)
            .await?)
    }

    //================================================================================
    // Reports
    //================================================================================

    /// Files a report. Fails with `DbError::UniqueViolation` when the reporter
    /// already reported this upload.
    pub async fn insert_report(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        reporter_id: i64,
        reason: ReportReason,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<UploadReport, DbError> {
        Ok(sqlx::query_as::<_, UploadReport>(
            r"
            INSERT INTO upload_report (upload_id, reporter_id, reason, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            ",
        )
        .bind(upload_id)
        .bind(reporter_id)
        .bind(reason)
        .bind(description)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_report(
        executor: impl Executor<'_, Database = Sqlite>,
        report_id: i64,
    ) -> Result<Option<UploadReport>, DbError> {
        Ok(
            sqlx::query_as::<_, UploadReport>("SELECT * FROM upload_report WHERE id = ?1")
                .bind(report_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Lists the reports filed against uploads of an album, newest first.
    pub async fn list_reports_for_album(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        include_resolved: bool,
    ) -> Result<Vec<UploadReport>, DbError> {
        Ok(sqlx::query_as::<_, UploadReport>(
            r"
            SELECT r.*
            FROM upload_report r
            JOIN upload u ON u.id = r.upload_id
            WHERE u.album_id = ?1 AND (?2 OR NOT r.is_resolved)
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(album_id)
        .bind(include_resolved)
        .fetch_all(executor)
        .await?)
    }

    pub async fn resolve_report(
        executor: impl Executor<'_, Database = Sqlite>,
        report_id: i64,
        resolved_by: i64,
        now: DateTime<Utc>,
    ) -> Result<UploadReport, DbError> {
        Ok(sqlx::query_as::<_, UploadReport>(
            r"
            UPDATE upload_report
            SET is_resolved = 1, resolved_by = ?1, resolved_at = ?2
            WHERE id = ?3
            RETURNING *
            ",
        )
        .bind(resolved_by)
        .bind(now)
        .bind(report_id)
        .fetch_one(executor)
        .await?)
    }
}
