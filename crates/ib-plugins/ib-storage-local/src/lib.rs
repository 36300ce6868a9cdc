//! # ib-storage-local
//!
//! Local filesystem implementation of `MediaStore`.
//! Content-addressable storage with directory sharding and thumbnailing.
//! The returned `image_ref` is the hex SHA-256 of the upload; the data
//! layer treats it as an opaque string.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

use ib_core::{AppError, MediaStore, Result};

/// Refs are 64 hex characters. Anything else is rejected before it can
/// reach the filesystem, which also rules out path traversal.
fn check_ref(image_ref: &str) -> Result<()> {
    if image_ref.len() == 64 && image_ref.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "malformed image ref: {image_ref}"
    )))
}

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        LocalMediaStore { root_path: root }
    }

    /// Sharded path: "ab/cd/abcdef...hash"
    fn sharded_path(&self, image_ref: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&image_ref[0..2]);
        path.push(&image_ref[2..4]);
        path.push(image_ref);
        path
    }

    fn thumbnail_path(&self, image_ref: &str) -> PathBuf {
        let mut path = self.sharded_path(image_ref);
        path.set_file_name(format!("thumb_{image_ref}.webp"));
        path
    }

    async fn generate_thumbnail(&self, data: &[u8], target_dir: &Path, image_ref: &str) -> Result<()> {
        let img = image::load_from_memory(data)
            .map_err(|e| AppError::Validation(format!("uploaded file is not a valid image: {e}")))?;
        let thumb = img.thumbnail(250, 250);
        let thumb_path = target_dir.join(format!("thumb_{image_ref}.webp"));
        thumb
            .save_with_format(thumb_path, image::ImageFormat::WebP)
            .map_err(|e| AppError::Internal(format!("thumbnail encode failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under its SHA-256 hash, which deduplicates repeated
    /// uploads for free. Rejects bytes the image decoder cannot identify.
    async fn save_upload(&self, data: Vec<u8>) -> Result<String> {
        image::guess_format(&data)
            .map_err(|_| AppError::Validation("uploaded file is not a valid image".to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let image_ref = format!("{:x}", hasher.finalize());

        let target_path = self.sharded_path(&image_ref);
        let parent = target_path
            .parent()
            .ok_or_else(|| AppError::Internal("upload path has no parent".to_string()))?
            .to_path_buf();
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !target_path.exists() {
            fs::write(&target_path, &data)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            self.generate_thumbnail(&data, &parent, &image_ref).await?;
            log::debug!("stored upload {image_ref}");
        }

        Ok(image_ref)
    }

    async fn open(&self, image_ref: &str) -> Result<Vec<u8>> {
        check_ref(image_ref)?;
        let path = self.sharded_path(image_ref);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("image", image_ref))
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }

    async fn open_thumbnail(&self, image_ref: &str) -> Result<Vec<u8>> {
        check_ref(image_ref)?;
        let path = self.thumbnail_path(image_ref);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("thumbnail", image_ref))
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }

    fn url(&self, image_ref: &str) -> String {
        format!("/image/{image_ref}")
    }

    fn thumbnail_url(&self, image_ref: &str) -> String {
        format!("/thumb/{image_ref}")
    }
}
