use crate::{
    AlbumPolicySettings, ApiSettings, DatabaseSettings, LoggingSettings, NotificationSettings,
    RawSettings, SecretSettings, ThumbnailSettings, normalize_extension,
};
use color_eyre::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf, absolute};

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub albums: AlbumPolicySettings,
    pub thumbnails: ThumbnailSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
    pub secrets: SecretSettings,
}

/// Blob store location, resolved to an absolute path.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub media_root: PathBuf,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let storage = StorageSettings {
            media_root: absolute(&raw.storage.media_root)?,
        };

        Ok(Self {
            api: raw.api,
            database: raw.database,
            storage,
            albums: raw.albums,
            thumbnails: raw.thumbnails,
            notifications: raw.notifications,
            logging: raw.logging,
            secrets: raw.secrets,
        })
    }
}

impl StorageSettings {
    /// Absolute path of a blob key below the media root.
    #[must_use]
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.media_root.join(key)
    }

    #[must_use]
    pub fn contains(&self, file: &Path) -> bool {
        file.starts_with(&self.media_root)
    }
}

impl AlbumPolicySettings {
    /// A fresh, normalized copy of the default allowed extensions for a new album.
    #[must_use]
    pub fn default_allowed_file_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::with_capacity(self.default_allowed_file_types.len());
        for extension in self.default_allowed_file_types.iter().map(|t| normalize_extension(t)) {
            if !extension.is_empty() && !types.contains(&extension) {
                types.push(extension);
            }
        }
        types
    }

    /// Public upload URL for an access code.
    #[must_use]
    pub fn upload_url(&self, access_code: &str) -> String {
        format!(
            "{}/upload/{access_code}",
            self.upload_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AlbumPolicySettings {
        AlbumPolicySettings {
            upload_base_url: "https://eventvault.com/".to_owned(),
            access_code_max_attempts: 10_000,
            default_allowed_file_types: vec![".JPG".into(), "png".into(), "jpg".into()],
            default_max_files_per_user: 10,
            default_max_file_size_mb: 50,
        }
    }

    #[test]
    fn upload_url_trims_trailing_slash() {
        assert_eq!(
            policy().upload_url("AB12CD34"),
            "https://eventvault.com/upload/AB12CD34"
        );
    }

    #[test]
    fn default_types_are_fresh_and_normalized() {
        let settings = policy();
        let mut first = settings.default_allowed_file_types();
        first.push("exe".into());
        assert_eq!(first, vec!["jpg", "png", "exe"]);
        assert_eq!(settings.default_allowed_file_types(), vec!["jpg", "png"]);
    }
}
