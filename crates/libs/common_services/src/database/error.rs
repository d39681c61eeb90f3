use sqlx::error::DatabaseError;
use thiserror::Error;

/// Detail SQLite puts in front of the `table.column` list of a unique violation.
const SQLITE_UNIQUE_DETAIL: &str = "UNIQUE constraint failed: ";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    /// `columns` holds the violated `table.column` names, or the constraint
    /// name when the driver reports one.
    #[error("Unique constraint violated on {columns:?}: {source}")]
    UniqueViolation {
        columns: Vec<String>,
        source: sqlx::Error,
    },

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl DbError {
    /// Whether this is a unique violation on `column`, given as `table.column`.
    #[must_use]
    pub fn violates_unique(&self, column: &str) -> bool {
        match self {
            Self::UniqueViolation { columns, .. } => columns.iter().any(|c| c == column),
            _ => false,
        }
    }
}

fn unique_columns(db_err: &dyn DatabaseError) -> Vec<String> {
    if let Some(constraint) = db_err.constraint() {
        return vec![constraint.to_owned()];
    }
    db_err
        .message()
        .strip_prefix(SQLITE_UNIQUE_DETAIL)
        .map(|list| list.split(',').map(|c| c.trim().to_owned()).collect())
        .unwrap_or_default()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::UniqueViolation {
                columns: unique_columns(db_err.as_ref()),
                source: err,
            },
            _ => Self::Sqlx(err),
        }
    }
}
