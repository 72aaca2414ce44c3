// storage/mod.rs - Object storage for uploaded ticket images

use async_trait::async_trait;
use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// MIME types accepted for ticket images
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/gif"];

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Blob storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An image received from a client, held in memory until stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn is_allowed_type(content_type: &str) -> bool {
        ALLOWED_IMAGE_TYPES.contains(&content_type)
    }

    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }

    /// Content-addressed object key, e.g. `tickets/3fa9...c1.png`
    pub fn object_key(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        format!("tickets/{:x}.{}", digest, self.extension())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the image and return its public URL.
    async fn put_image(&self, image: &ImageUpload) -> Result<String, BlobError>;
}

/// Writes objects below a local directory that the router serves at `/uploads`
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put_image(&self, image: &ImageUpload) -> Result<String, BlobError> {
        let key = image.object_key();
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &image.bytes).await?;

        info!("Stored image {} ({} bytes)", key, image.bytes.len());
        Ok(format!("{}/uploads/{}", self.public_base_url, key))
    }
}
