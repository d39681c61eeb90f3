use crate::database::DbError;
use crate::database::app_user::{User, UserRole};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

pub struct UserStore;

impl UserStore {
    /// Inserts or refreshes the local mirror of an identity-provider user.
    pub async fn upsert(
        executor: impl Executor<'_, Database = Sqlite>,
        user_id: i64,
        email: &str,
        name: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<User, DbError> {
        Ok(sqlx::query_as::<_, User>(
            r"
            INSERT INTO app_user (id, email, name, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                role = excluded.role,
                updated_at = excluded.updated_at
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(now)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        user_id: i64,
    ) -> Result<Option<User>, DbError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE id = ?1")
                .bind(user_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn find_by_email(
        executor: impl Executor<'_, Database = Sqlite>,
        email: &str,
    ) -> Result<Option<User>, DbError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE email = ?1 COLLATE NOCASE")
                .bind(email)
                .fetch_optional(executor)
                .await?,
        )
    }
}
