use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub storage: RawStorageSettings,
    pub albums: AlbumPolicySettings,
    pub thumbnails: ThumbnailSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
    pub secrets: SecretSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Where this API is reachable, used to build absolute media URLs.
    pub public_url: String,
    /// Upper bound for a multipart request body on the guest upload route.
    pub max_upload_body_mb: usize,
    pub rate_limiting: RateLimitingSettings,
}

/// Per-IP limits for the anonymous upload route.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitingSettings {
    pub req_per_second: u64,
    pub burst_size: u32,
}

/// Database connection and related configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
    /// Length of generated `id` to use for albums.
    pub album_id_length: usize,
    /// Length of generated `id` to use for uploads and notifications.
    pub upload_id_length: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawStorageSettings {
    /// Root folder of the blob store. Uploads, thumbnails and QR codes live below it.
    pub media_root: PathBuf,
}

/// Album defaults and access-code policy.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlbumPolicySettings {
    /// Base of the public upload URL encoded in QR codes, e.g. `https://eventvault.com`.
    pub upload_base_url: String,
    /// How many fresh access codes to try before giving up on album creation.
    pub access_code_max_attempts: u32,
    pub default_allowed_file_types: Vec<String>,
    pub default_max_files_per_user: u32,
    pub default_max_file_size_mb: u32,
}

/// Configuration for derived image artifacts.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThumbnailSettings {
    /// Longest side of a generated thumbnail, in pixels.
    pub max_side: u32,
    /// JPEG quality 1..=100.
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    pub from_address: String,
    pub from_name: String,
    /// Default `max_retries` for newly queued emails.
    pub email_max_retries: i32,
    pub transport: EmailTransportSettings,
}

/// Which outbound email transport to use.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmailTransportSettings {
    /// Write emails to the log only.
    Log,
    /// POST every email as JSON to an HTTP mail API.
    Http {
        endpoint: String,
        api_key: Option<String>,
        timeout_seconds: u64,
    },
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    /// Shared secret used to verify bearer tokens from the identity provider.
    pub jwt: String,
    pub database_url: String,
}
