#![allow(dead_code)]

use app_state::{AppSettings, load_settings_from_path};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use color_eyre::Result;
use common_services::api::album::interfaces::CreateAlbumRequest;
use common_services::api::album::service::create_album;
use common_services::api::notification::email::EmailDispatcher;
use common_services::blob_store::LocalBlobStore;
use common_services::database::album::album::{Album, AlbumStatus};
use common_services::database::app_user::{User, UserRole};
use common_services::database::get_db_pool;
use common_services::database::user_store::UserStore;
use common_services::email_transport::{EmailTransport, EmailTransportError, OutgoingEmail};
use image::{DynamicImage, ImageFormat, RgbImage};
use sqlx::SqlitePool;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Remembers every email and fails on demand.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub failing: AtomicBool,
}

impl RecordingTransport {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailTransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailTransportError::Rejected("mailbox unavailable".to_owned()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestEnv {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub blobs: LocalBlobStore,
    pub transport: Arc<RecordingTransport>,
    pub mailer: EmailDispatcher,
    _dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let media_root = dir.path().join("media");
        let yaml = include_str!("../../../../../config/settings.yaml").replace(
            "media_root: ./media",
            &format!("media_root: {}", media_root.display()),
        );
        let settings_path = dir.path().join("settings.yaml");
        std::fs::write(&settings_path, yaml)?;
        let settings = load_settings_from_path(&settings_path, false)?;

        let database_url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = get_db_pool(&database_url, &settings.database).await?;

        let transport = Arc::new(RecordingTransport::default());
        let mailer = EmailDispatcher::new(transport.clone(), &settings.notifications);

        Ok(Self {
            pool,
            blobs: LocalBlobStore::new(&settings.storage.media_root),
            settings,
            transport,
            mailer,
            _dir: dir,
        })
    }

    pub async fn user(&self, id: i64, name: &str) -> Result<User> {
        self.user_with_role(id, name, UserRole::User).await
    }

    pub async fn user_with_role(&self, id: i64, name: &str, role: UserRole) -> Result<User> {
        let email = format!("{}@example.com", name.to_lowercase());
        Ok(UserStore::upsert(&self.pool, id, &email, name, role, Utc::now()).await?)
    }

    /// An active album that accepts jpg and png up to 10 MB.
    pub async fn active_album(&self, owner: &User) -> Result<Album> {
        self.album_with(
            owner,
            CreateAlbumRequest {
                title: "Summer Wedding".to_owned(),
                status: Some(AlbumStatus::Active),
                allowed_file_types: Some(vec!["jpg".to_owned(), "png".to_owned()]),
                max_file_size_mb: Some(10),
                ..CreateAlbumRequest::default()
            },
        )
        .await
    }

    pub async fn album_with(&self, owner: &User, request: CreateAlbumRequest) -> Result<Album> {
        Ok(create_album(&self.pool, &self.settings, &self.blobs, owner, request).await?)
    }

    pub fn media_path(&self, key: &str) -> std::path::PathBuf {
        self.settings.storage.media_root.join(key)
    }
}

/// Encodes a solid-colour RGB image.
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 80, 40])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

pub fn bytes_of_size(size: usize) -> Bytes {
    Bytes::from(vec![0xAB; size])
}

pub const MB: usize = 1_048_576;

/// Counts `upload_like` rows directly, bypassing the cached counter.
pub async fn like_rows(pool: &SqlitePool, upload_id: &str) -> Result<i64> {
    Ok(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM upload_like WHERE upload_id = ?1")
            .bind(upload_id)
            .fetch_one(pool)
            .await?,
    )
}
