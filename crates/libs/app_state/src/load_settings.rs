use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads `config/settings.yaml`, layered with `APP__*` environment variables.
pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite the db url from env.
    dotenv::from_path(".env").ok();
    load_settings_from_path(Path::new("config/settings.yaml"), true)
}

/// Loads settings from a specific yaml file. Environment overrides are optional so tests
/// can pin their configuration.
pub fn load_settings_from_path(path: &Path, with_env: bool) -> Result<AppSettings> {
    let config_path = path.canonicalize()?;
    info!("Loading settings from {}", config_path.display());

    let mut builder = config::Config::builder().add_source(config::File::from(config_path));
    if with_env {
        builder = builder.add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );
    }

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    let settings = AppSettings::try_from(raw_settings)?;

    fs::create_dir_all(&settings.storage.media_root)?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmailTransportSettings;

    #[test]
    fn loads_yaml_and_resolves_media_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let media_root = dir.path().join("media");
        let yaml = include_str!("../../../../config/settings.yaml").replace(
            "media_root: ./media",
            &format!("media_root: {}", media_root.display()),
        );
        let path = dir.path().join("settings.yaml");
        fs::write(&path, yaml)?;

        let settings = load_settings_from_path(&path, false)?;

        assert!(settings.storage.media_root.is_absolute());
        assert!(media_root.exists());
        assert_eq!(settings.thumbnails.max_side, 300);
        assert_eq!(settings.thumbnails.jpeg_quality, 85);
        assert_eq!(settings.albums.access_code_max_attempts, 10_000);
        assert_eq!(settings.notifications.email_max_retries, 3);
        assert_eq!(settings.notifications.transport, EmailTransportSettings::Log);
        Ok(())
    }
}
