//! Image storage for event banners
//!
//! Uploaded files are handed to an [`ImageStore`], which persists them and
//! returns the public URL saved on the event. [`LocalImageStore`] writes to a
//! directory that the server exposes under the configured URL prefix.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{Error, Result};

/// An image received from a form upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name supplied by the client
    pub file_name: Option<String>,
    /// Declared MIME type
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Reject empty files and anything not declared as an image
    pub fn check(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(Error::invalid_input("Image file is empty"));
        }
        match self.content_type.as_deref() {
            Some(ct) if ct.starts_with("image/") => Ok(()),
            Some(ct) => Err(Error::invalid_input(format!("Unsupported image type: {}", ct))),
            None => Err(Error::invalid_input("Image content type is missing")),
        }
    }

    /// Lower-cased file extension, if it is a plain alphanumeric one
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(ext)
        } else {
            None
        }
    }
}

/// Somewhere to put uploaded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return its public URL
    async fn store(&self, image: ImageUpload) -> Result<String>;

    /// Delete an image previously returned by [`ImageStore::store`].
    ///
    /// URLs this store did not hand out are left alone.
    async fn remove(&self, url: &str) -> Result<()>;
}

/// Stores images on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.dir_path(), config.normalized_prefix())
    }

    /// Directory images are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, image: ImageUpload) -> Result<String> {
        image.check()?;

        let file_name = match image.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::upload(format!("Failed to create upload directory: {}", e)))?;
        tokio::fs::write(self.dir.join(&file_name), &image.data)
            .await
            .map_err(|e| Error::upload(format!("Failed to write image: {}", e)))?;

        tracing::info!(
            file = %file_name,
            bytes = image.data.len() as u64,
            "Image stored"
        );

        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let prefix = format!("{}/", self.url_prefix.trim_end_matches('/'));
        let Some(file_name) = url.strip_prefix(&prefix) else {
            return Ok(());
        };
        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return Err(Error::invalid_input(format!("Not a stored image: {}", url)));
        }

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {
                tracing::info!(file = %file_name, "Image removed");
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::upload(format!("Failed to remove image: {}", e))),
        }
    }
}
