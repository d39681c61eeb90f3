use crate::api::upload::interfaces::{FileTypeCount, UploadListFilter, UploadTotals};
use crate::database::DbError;
use crate::database::upload::{NewUpload, Upload, UploadStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteQueryResult;
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite};

pub struct UploadStore;

impl UploadStore {
    //================================================================================
    // Core Upload Management
    //================================================================================

    pub async fn insert(
        executor: impl Executor<'_, Database = Sqlite>,
        upload: &NewUpload,
        now: DateTime<Utc>,
    ) -> Result<Upload, DbError> {
        Ok(sqlx::query_as::<_, Upload>(
            r"
            INSERT INTO upload (
                id, album_id, file_path, original_filename, file_type, file_size, mime_type,
                thumbnail_path, width, height, uploader_name, uploader_email, uploader_phone,
                uploader_user_id, caption, message, exif_data, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19)
            RETURNING *
            ",
        )
        .bind(&upload.id)
        .bind(&upload.album_id)
        .bind(&upload.file_path)
        .bind(&upload.original_filename)
        .bind(upload.file_type)
        .bind(upload.file_size)
        .bind(&upload.mime_type)
        .bind(&upload.thumbnail_path)
        .bind(upload.width)
        .bind(upload.height)
        .bind(&upload.uploader_name)
        .bind(&upload.uploader_email)
        .bind(&upload.uploader_phone)
        .bind(upload.uploader_user_id)
        .bind(&upload.caption)
        .bind(&upload.message)
        .bind(Json(&upload.exif_data))
        .bind(upload.status)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
    ) -> Result<Option<Upload>, DbError> {
        Ok(
            sqlx::query_as::<_, Upload>("SELECT * FROM upload WHERE id = ?1")
                .bind(upload_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Retrieves an upload, only if it belongs to the given album.
    pub async fn find_in_album(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        upload_id: &str,
    ) -> Result<Option<Upload>, DbError> {
        Ok(
            sqlx::query_as::<_, Upload>("SELECT * FROM upload WHERE id = ?1 AND album_id = ?2")
                .bind(upload_id)
                .bind(album_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn find_many_in_album(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        upload_ids: &[String],
    ) -> Result<Vec<Upload>, DbError> {
        if upload_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM upload WHERE album_id = ");
        qb.push_bind(album_id);
        push_id_list(&mut qb, upload_ids);
        Ok(qb.build_query_as::<Upload>().fetch_all(executor).await?)
    }

    /// Lists an album's uploads, filtered and ordered.
    pub async fn list_for_album(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        filter: &UploadListFilter,
    ) -> Result<Vec<Upload>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM upload WHERE album_id = ");
        qb.push_bind(album_id);

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            qb.push(" AND (original_filename LIKE ")
                .push_bind(pattern.clone())
                .push(" OR caption LIKE ")
                .push_bind(pattern.clone())
                .push(" OR message LIKE ")
                .push_bind(pattern.clone())
                .push(" OR uploader_name LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY ").push(filter.ordering.as_sql());
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        Ok(qb.build_query_as::<Upload>().fetch_all(executor).await?)
    }

    /// Number of uploads in an album attributed to one uploader. A registered
    /// user is matched by id, a guest by email.
    pub async fn count_for_uploader(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        uploader_user_id: Option<i64>,
        uploader_email: &str,
    ) -> Result<i64, DbError> {
        let count = match uploader_user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM upload WHERE album_id = ?1 AND uploader_user_id = ?2",
                )
                .bind(album_id)
                .bind(user_id)
                .fetch_one(executor)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM upload WHERE album_id = ?1 AND uploader_email = ?2 COLLATE NOCASE",
                )
                .bind(album_id)
                .bind(uploader_email)
                .fetch_one(executor)
                .await?
            }
        };
        Ok(count)
    }

    pub async fn update_text(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        caption: Option<String>,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Upload, DbError> {
        Ok(sqlx::query_as::<_, Upload>(
            r"
            UPDATE upload
            SET caption = COALESCE(?1, caption),
                message = COALESCE(?2, message),
                updated_at = ?3
            WHERE id = ?4
            RETURNING *
            ",
        )
        .bind(caption)
        .bind(message)
        .bind(now)
        .bind(upload_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn delete(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
    ) -> Result<SqliteQueryResult, DbError> {
        Ok(sqlx::query("DELETE FROM upload WHERE id = ?1")
            .bind(upload_id)
            .execute(executor)
            .await?)
    }

    //================================================================================
    // Moderation
    //================================================================================

    pub async fn set_moderation(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        status: UploadStatus,
        note: &str,
        moderator_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Upload, DbError> {
        Ok(sqlx::query_as::<_, Upload>(
            r"
            UPDATE upload
            SET status = ?1, moderation_note = ?2, moderated_by = ?3, moderated_at = ?4, updated_at = ?4
            WHERE id = ?5
            RETURNING *
            ",
        )
        .bind(status)
        .bind(note)
        .bind(moderator_id)
        .bind(now)
        .bind(upload_id)
        .fetch_one(executor)
        .await?)
    }

    /// Sets the status of every listed upload that belongs to the album.
    /// Returns the number of rows changed.
    pub async fn bulk_set_status(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        upload_ids: &[String],
        status: UploadStatus,
        moderator_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        if upload_ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE upload SET status = ");
        qb.push_bind(status)
            .push(", moderated_by = ")
            .push_bind(moderator_id)
            .push(", moderated_at = ")
            .push_bind(now)
            .push(", updated_at = ")
            .push_bind(now)
            .push(" WHERE album_id = ")
            .push_bind(album_id);
        push_id_list(&mut qb, upload_ids);
        Ok(qb.build().execute(executor).await?.rows_affected())
    }

    /// Deletes every listed upload that belongs to the album.
    /// Returns the number of rows removed.
    pub async fn bulk_delete(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        upload_ids: &[String],
    ) -> Result<u64, DbError> {
        if upload_ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM upload WHERE album_id = ");
        qb.push_bind(album_id);
        push_id_list(&mut qb, upload_ids);
        Ok(qb.build().execute(executor).await?.rows_affected())
    }

    //================================================================================
    // Counters & Statistics
    //================================================================================

    pub async fn increment_view_count(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE upload SET view_count = view_count + 1 WHERE id = ?1")
            .bind(upload_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn increment_download_count(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE upload SET download_count = download_count + 1 WHERE id = ?1")
            .bind(upload_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Adds `delta` to the like counter, never going below zero.
    /// Returns the new count.
    pub async fn adjust_like_count(
        executor: impl Executor<'_, Database = Sqlite>,
        upload_id: &str,
        delta: i64,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "UPDATE upload SET like_count = MAX(like_count + ?1, 0) WHERE id = ?2 RETURNING like_count",
        )
        .bind(delta)
        .bind(upload_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn totals(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<UploadTotals, DbError> {
        Ok(sqlx::query_as::<_, UploadTotals>(
            r"
            SELECT
                COUNT(*) AS total_uploads,
                COALESCE(SUM(view_count), 0) AS total_views,
                COALESCE(SUM(like_count), 0) AS total_likes,
                COALESCE(SUM(download_count), 0) AS total_downloads,
                COALESCE(SUM(file_size), 0) AS total_size_bytes,
                COALESCE(SUM(status = 'pending'), 0) AS pending_uploads
            FROM upload
            WHERE album_id = ?1
            ",
        )
        .bind(album_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn file_type_breakdown(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<Vec<FileTypeCount>, DbError> {
        Ok(sqlx::query_as::<_, FileTypeCount>(
            r"
            SELECT file_type, COUNT(*) AS count
            FROM upload
            WHERE album_id = ?1
            GROUP BY file_type
            ORDER BY count DESC, file_type
            ",
        )
        .bind(album_id)
        .fetch_all(executor)
        .await?)
    }
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, upload_ids: &[String]) {
    qb.push(" AND id IN (");
    let mut separated = qb.separated(", ");
    for id in upload_ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
}
