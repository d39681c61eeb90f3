//! Storage for uploaded files and derived artifacts, addressed by relative keys
//! such as `uploads/AB12CD34/<uuid>.jpg`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const MAX_KEY_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Opens a blob for reading.
    async fn open(&self, key: &str) -> Result<File, BlobError>;

    /// Removes a blob. Removing a missing blob is not an error.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Filesystem location of a blob, for processors that need a path.
    fn local_path(&self, key: &str) -> Result<PathBuf, BlobError>;
}

/// A blob store rooted in a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rejects keys that could escape the root directory.
    fn ensure_key_safe(key: &str) -> Result<(), BlobError> {
        let invalid = key.is_empty()
            || key.len() > MAX_KEY_LEN
            || key.starts_with('/')
            || key.split('/').any(|segment| segment.is_empty() || segment == "..")
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b':');
        if invalid {
            return Err(BlobError::InvalidKey(key.to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let path = self.local_path(key)?;
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BlobError::InvalidKey(key.to_owned()))?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let write_result = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<File, BlobError> {
        let path = self.local_path(key)?;
        File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                BlobError::NotFound(key.to_owned())
            } else {
                BlobError::Io(err)
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.local_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn local_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        Self::ensure_key_safe(key)?;
        Ok(self.root.join(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn put_open_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store.put("uploads/ABCD1234/a.txt", b"hello").await.unwrap();
        let mut contents = String::new();
        store
            .open("uploads/ABCD1234/a.txt")
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents, "hello");

        store.delete("uploads/ABCD1234/a.txt").await.unwrap();
        assert!(matches!(
            store.open("uploads/ABCD1234/a.txt").await,
            Err(BlobError::NotFound(_))
        ));
        store.delete("uploads/ABCD1234/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.put("qr_codes/qr.png", b"png").await.unwrap();
        store.put("qr_codes/qr.png", b"png2").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("qr_codes"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["qr.png".to_owned()]);
    }

    #[test]
    fn rejects_escaping_keys() {
        let store = LocalBlobStore::new("/srv/media");
        for key in ["", "/etc/passwd", "../secret", "a/../../b", "a//b", "a\\b", "c:x"] {
            assert!(store.local_path(key).is_err(), "accepted {key:?}");
        }
        assert_eq!(
            store.local_path("thumbnails/thumb_x.jpg").unwrap(),
            PathBuf::from("/srv/media/thumbnails/thumb_x.jpg")
        );
    }
}
