use crate::database::DbError;
use crate::database::event_type::EventType;
use sqlx::{Executor, Sqlite};

pub struct EventTypeStore;

impl EventTypeStore {
    pub async fn list_active(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> Result<Vec<EventType>, DbError> {
        Ok(sqlx::query_as::<_, EventType>(
            "SELECT * FROM event_type WHERE is_active ORDER BY sort_order, name",
        )
        .fetch_all(executor)
        .await?)
    }

    pub async fn exists(
        executor: impl Executor<'_, Database = Sqlite>,
        event_type_id: i64,
    ) -> Result<bool, DbError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM event_type WHERE id = ?1 AND is_active)",
        )
        .bind(event_type_id)
        .fetch_one(executor)
        .await?)
    }
}
