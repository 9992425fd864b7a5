//! Image storage for user photos.
//!
//! [`ImageStore`] stores an uploaded image and returns the public URL it is
//! served from. [`LocalImageStore`] writes into a directory exposed under
//! the configured asset base URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raw file received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("unsupported image type '{0}'; expected jpeg, png, gif or webp")]
    UnsupportedContentType(String),
    #[error("uploaded file is empty")]
    Empty,
    #[error("uploaded file is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageStoreError {
    /// Errors caused by the upload itself rather than the storage backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImageStoreError::Io(_))
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `upload` and returns its public URL. Callers remove a replaced
    /// image with [`ImageStore::delete`] once the new URL is persisted.
    async fn save(&self, upload: ImageUpload) -> Result<String, ImageStoreError>;

    /// Removes the image behind `url`. Unknown URLs are ignored.
    async fn delete(&self, url: &str) -> Result<(), ImageStoreError>;
}

/// Filesystem-backed image store
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    upload_dir: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(upload_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.upload_dir, config.asset_base_url())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// File name inside the upload directory for a URL issued by this store.
    fn file_name_for(&self, url: &str) -> Option<String> {
        let name = url
            .strip_prefix(&self.public_base_url)?
            .strip_prefix('/')?;

        let is_plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        is_plain.then(|| name.to_string())
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, upload: ImageUpload) -> Result<String, ImageStoreError> {
        let content_type = upload.content_type.unwrap_or_default();
        let extension = extension_for(&content_type)
            .ok_or_else(|| ImageStoreError::UnsupportedContentType(content_type.clone()))?;

        if upload.bytes.is_empty() {
            return Err(ImageStoreError::Empty);
        }
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageStoreError::TooLarge {
                size: upload.bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let simple = Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "user_{}_{}.{}",
            Utc::now().format("%d%m%Y%H%M%S"),
            &simple[..8],
            extension
        );
        tokio::fs::write(self.upload_dir.join(&file_name), &upload.bytes).await?;

        tracing::info!(
            file = %file_name,
            original = upload.file_name.as_deref().unwrap_or(""),
            bytes = upload.bytes.len(),
            "stored image"
        );

        Ok(format!("{}/{}", self.public_base_url, file_name))
    }

    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        let Some(name) = self.file_name_for(url) else {
            tracing::debug!(url, "image not managed by this store, skipping delete");
            return Ok(());
        };

        match tokio::fs::remove_file(self.upload_dir.join(&name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: Some("avatar.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn saves_and_deletes_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost:8080/uploads/");

        let first = store.save(png(b"first")).await.unwrap();
        assert!(first.starts_with("http://localhost:8080/uploads/user_"));
        assert!(first.ends_with(".png"));

        let first_name = store.file_name_for(&first).unwrap();
        assert!(dir.path().join(&first_name).exists());

        let second = store.save(png(b"second")).await.unwrap();
        let second_name = store.file_name_for(&second).unwrap();
        assert!(dir.path().join(&first_name).exists());

        store.delete(&first).await.unwrap();
        store.delete(&first).await.unwrap();

        assert!(!dir.path().join(&first_name).exists());
        assert_eq!(
            std::fs::read(dir.path().join(second_name)).unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/uploads");

        let upload = ImageUpload {
            file_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
        };
        let err = store.save(upload).await.unwrap_err();

        assert!(matches!(err, ImageStoreError::UnsupportedContentType(_)));
        assert!(err.is_client_error());

        let err = store.save(png(b"")).await.unwrap_err();
        assert!(matches!(err, ImageStoreError::Empty));
    }

    #[tokio::test]
    async fn foreign_urls_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/uploads");

        assert!(store.file_name_for("https://cdn.example.org/a.png").is_none());
        assert!(store.file_name_for("http://localhost/uploads/../secret").is_none());
        store.delete("https://cdn.example.org/a.png").await.unwrap();
    }
}
