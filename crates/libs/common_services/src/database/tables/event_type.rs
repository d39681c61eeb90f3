use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A kind of event an album can be created for, e.g. a wedding.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub is_active: bool,
    pub sort_order: i64,
}
