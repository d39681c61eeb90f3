use app_state::DatabaseSettings;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Run migrations and get a database connection pool.
/// # Errors
///
/// * `SqliteConnectOptions::from_str` can return an error if the database URL is malformed.
/// * `SqlitePoolOptions::connect_with` can return an error if the database connection fails.
/// * `sqlx::migrate` can return an error if migrations fail.
pub async fn get_db_pool(
    database_url: &str,
    db_settings: &DatabaseSettings,
) -> color_eyre::Result<SqlitePool> {
    info!("Connecting to database.");
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(db_settings.acquire_timeout));

    let pool = SqlitePoolOptions::new()
        .max_connections(db_settings.max_connections)
        .min_connections(db_settings.min_connections)
        .max_lifetime(Duration::from_secs(db_settings.max_lifetime))
        .idle_timeout(Duration::from_secs(db_settings.idle_timeout))
        .acquire_timeout(Duration::from_secs(db_settings.acquire_timeout))
        .connect_with(options)
        .await?;

    sqlx::migrate!("../../../migrations").run(&pool).await?;
    info!("Database migrations applied.");
    Ok(pool)
}
