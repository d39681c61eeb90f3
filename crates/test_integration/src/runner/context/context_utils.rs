use app_state::{AppSettings, load_settings_from_path};
use color_eyre::Result;
use common_services::database::get_db_pool;
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads the test settings with the media root moved into `dir`.
pub fn create_test_settings(settings_path: &Path, dir: &Path) -> Result<AppSettings> {
    let media_root = dir.join("media");
    let yaml = fs::read_to_string(settings_path)?.replace(
        "media_root: ./media",
        &format!("media_root: {}", media_root.display()),
    );
    let test_settings_path = dir.join("settings.yaml");
    fs::write(&test_settings_path, yaml)?;

    load_settings_from_path(&test_settings_path, false)
}

/// Creates a fresh, migrated `SQLite` database file inside `dir`.
pub async fn create_test_database(settings: &AppSettings, dir: &Path) -> Result<SqlitePool> {
    let database_url = format!("sqlite://{}", dir.join("test.db").display());
    info!("Creating test database at {}", database_url);
    get_db_pool(&database_url, &settings.database).await
}
