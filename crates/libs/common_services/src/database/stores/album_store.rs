use crate::api::album::interfaces::{AlbumOrdering, OwnerAlbumStats};
use crate::database::DbError;
use crate::database::album::album::{
    Album, AlbumChanges, AlbumStatus, AlbumWithCount, NewAlbum,
};
use crate::database::album::album_collaborator::{AlbumCollaborator, CollaboratorRole};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteQueryResult;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

pub struct AlbumStore;

impl AlbumStore {
    //================================================================================
    // Core Album Management
    //================================================================================

    /// Inserts a new album with the given access code.
    ///
    /// Fails with `DbError::UniqueViolation` when the code is already taken.
    pub async fn create(
        executor: impl Executor<'_, Database = Sqlite>,
        album: &NewAlbum,
        access_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Album, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            r"
            INSERT INTO album (
                id, owner_id, title, description, event_type_id, event_date, event_location,
                status, privacy, password_hash, access_code, max_files_per_user,
                allowed_file_types, max_file_size_mb, require_approval, enable_comments,
                expires_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)
            RETURNING *
            ",
        )
        .bind(&album.id)
        .bind(album.owner_id)
        .bind(&album.title)
        .bind(&album.description)
        .bind(album.event_type_id)
        .bind(album.event_date)
        .bind(&album.event_location)
        .bind(album.status)
        .bind(album.privacy)
        .bind(&album.password_hash)
        .bind(access_code)
        .bind(album.max_files_per_user)
        .bind(Json(&album.allowed_file_types))
        .bind(album.max_file_size_mb)
        .bind(album.require_approval)
        .bind(album.enable_comments)
        .bind(album.expires_at)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    /// Updates the details of a specific album.
    pub async fn update(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        changes: &AlbumChanges,
        now: DateTime<Utc>,
    ) -> Result<Album, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            r"
            UPDATE album
            SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                event_type_id = COALESCE(?3, event_type_id),
                event_date = COALESCE(?4, event_date),
                event_location = COALESCE(?5, event_location),
                privacy = COALESCE(?6, privacy),
                password_hash = COALESCE(?7, password_hash),
                max_files_per_user = COALESCE(?8, max_files_per_user),
                allowed_file_types = COALESCE(?9, allowed_file_types),
                max_file_size_mb = COALESCE(?10, max_file_size_mb),
                require_approval = COALESCE(?11, require_approval),
                enable_comments = COALESCE(?12, enable_comments),
                expires_at = COALESCE(?13, expires_at),
                updated_at = ?14
            WHERE id = ?15
            RETURNING *
            ",
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.event_type_id)
        .bind(changes.event_date)
        .bind(&changes.event_location)
        .bind(changes.privacy)
        .bind(&changes.password_hash)
        .bind(changes.max_files_per_user)
        .bind(changes.allowed_file_types.as_ref().map(Json))
        .bind(changes.max_file_size_mb)
        .bind(changes.require_approval)
        .bind(changes.enable_comments)
        .bind(changes.expires_at)
        .bind(now)
        .bind(album_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn set_status(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        status: AlbumStatus,
        now: DateTime<Utc>,
    ) -> Result<Album, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            "UPDATE album SET status = ?1, updated_at = ?2 WHERE id = ?3 RETURNING *",
        )
        .bind(status)
        .bind(now)
        .bind(album_id)
        .fetch_one(executor)
        .await?)
    }

    /// Records the QR code location, only if none was stored before.
    /// Returns whether the row was updated.
    pub async fn set_qr_code_path_if_missing(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        qr_code_path: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE album SET qr_code_path = ?1 WHERE id = ?2 AND qr_code_path IS NULL",
        )
        .bind(qr_code_path)
        .bind(album_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Retrieves a single album by its ID.
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<Option<Album>, DbError> {
        Ok(
            sqlx::query_as::<_, Album>("SELECT * FROM album WHERE id = ?1")
                .bind(album_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn find_by_access_code(
        executor: impl Executor<'_, Database = Sqlite>,
        access_code: &str,
    ) -> Result<Option<Album>, DbError> {
        Ok(
            sqlx::query_as::<_, Album>("SELECT * FROM album WHERE access_code = ?1")
                .bind(access_code)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Lists albums the user owns or collaborates on, with upload totals.
    pub async fn list_for_user(
        executor: impl Executor<'_, Database = Sqlite>,
        user_id: i64,
        search: Option<&str>,
        ordering: AlbumOrdering,
    ) -> Result<Vec<AlbumWithCount>, DbError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        let query = format!(
            r"
            SELECT
                a.*,
                COUNT(u.id) AS total_uploads,
                COALESCE(SUM(u.file_size), 0) AS total_size_bytes
            FROM album a
            LEFT JOIN upload u ON u.album_id = a.id
            WHERE
                (a.owner_id = ?1 OR EXISTS (
                    SELECT 1 FROM album_collaborator ac
                    WHERE ac.album_id = a.id AND ac.user_id = ?1
                ))
                AND (?2 IS NULL
                    OR a.title LIKE ?2
                    OR a.description LIKE ?2
                    OR a.event_location LIKE ?2)
            GROUP BY a.id
            ORDER BY {}
            ",
            ordering.as_sql()
        );
        Ok(sqlx::query_as::<_, AlbumWithCount>(&query)
            .bind(user_id)
            .bind(pattern)
            .fetch_all(executor)
            .await?)
    }

    pub async fn delete(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<SqliteQueryResult, DbError> {
        Ok(sqlx::query("DELETE FROM album WHERE id = ?1")
            .bind(album_id)
            .execute(executor)
            .await?)
    }

    //================================================================================
    // Counters & Statistics
    //================================================================================

    pub async fn increment_view_count(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE album SET view_count = view_count + 1 WHERE id = ?1")
            .bind(album_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn increment_download_count(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE album SET download_count = download_count + 1 WHERE id = ?1")
            .bind(album_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Totals across all albums owned by a user.
    pub async fn owner_stats(
        executor: impl Executor<'_, Database = Sqlite>,
        owner_id: i64,
    ) -> Result<OwnerAlbumStats, DbError> {
        Ok(sqlx::query_as::<_, OwnerAlbumStats>(
            r"
            SELECT
                COUNT(*) AS total_albums,
                COALESCE(SUM(a.status = 'active'), 0) AS active_albums,
                COALESCE(SUM(
                    (SELECT COUNT(*) FROM upload u WHERE u.album_id = a.id)
                ), 0) AS total_uploads
            FROM album a
            WHERE a.owner_id = ?1
            ",
        )
        .bind(owner_id)
        .fetch_one(executor)
        .await?)
    }

    //================================================================================
    // Collaborator Management
    //================================================================================

    /// Finds the collaborator role of a user in an album.
    pub async fn find_collaborator_role(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        user_id: i64,
    ) -> Result<Option<CollaboratorRole>, DbError> {
        Ok(sqlx::query_scalar::<_, CollaboratorRole>(
            "SELECT role FROM album_collaborator WHERE album_id = ?1 AND user_id = ?2",
        )
        .bind(album_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn list_collaborators(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
    ) -> Result<Vec<AlbumCollaborator>, DbError> {
        Ok(sqlx::query_as::<_, AlbumCollaborator>(
            r"
            SELECT
                ac.id, ac.album_id, ac.user_id, u.name AS user_name, u.email AS user_email,
                ac.role, ac.invited_by, ac.created_at
            FROM album_collaborator ac
            JOIN app_user u ON u.id = ac.user_id
            WHERE ac.album_id = ?1
            ORDER BY ac.created_at
            ",
        )
        .bind(album_id)
        .fetch_all(executor)
        .await?)
    }

    /// Adds a collaborator or changes the role of an existing one.
    pub async fn upsert_collaborator(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        user_id: i64,
        role: CollaboratorRole,
        invited_by: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO album_collaborator (album_id, user_id, role, invited_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (album_id, user_id) DO UPDATE SET role = excluded.role
            ",
        )
        .bind(album_id)
        .bind(user_id)
        .bind(role)
        .bind(invited_by)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn remove_collaborator(
        executor: impl Executor<'_, Database = Sqlite>,
        album_id: &str,
        user_id: i64,
    ) -> Result<SqliteQueryResult, DbError> {
        Ok(
            sqlx::query("DELETE FROM album_collaborator WHERE album_id = ?1 AND user_id = ?2")
                .bind(album_id)
                .bind(user_id)
                .execute(executor)
                .await?,
        )
    }
}
