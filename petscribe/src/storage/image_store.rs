//! Content-addressed pet photo storage
//!
//! Picked photos are copied here so a pet's `image` URI keeps working after
//! the source file moves. Files are keyed by SHA-256 and fanned out into
//! a two-level directory structure.
//!
//! Example: hash "abcd1234..." is stored at "images/ab/cd/abcd1234..."

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Content-addressed image store
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a new image store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the image store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Image store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write image bytes, returns the SHA-256 hash
    pub async fn write(&self, data: &[u8]) -> Result<String> {
        let hash = calculate_hash(data);

        if self.exists(&hash) {
            tracing::debug!("Image already stored: {}", hash);
            return Ok(hash);
        }

        let path = self.get_path(&hash)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to temp file first (atomic write)
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(temp_path, &path).await?;

        tracing::debug!("Stored image: {} ({} bytes)", hash, data.len());

        Ok(hash)
    }

    /// Copy a local file into the store and return a `file://` URI for it
    pub async fn import_file(&self, source: &Path) -> Result<String> {
        let data = fs::read(source).await.map_err(|e| {
            AppError::Validation(format!("Cannot read image {:?}: {}", source, e))
        })?;

        if data.is_empty() {
            return Err(AppError::Validation(format!(
                "Image file {:?} is empty",
                source
            )));
        }

        let hash = self.write(&data).await?;
        tracing::info!("Imported image {:?} as {}", source, hash);

        self.uri_for(&hash)
    }

    /// Check if an image exists
    pub fn exists(&self, hash: &str) -> bool {
        self.get_path(hash).map(|p| p.exists()).unwrap_or(false)
    }

    /// `file://` URI of a stored image
    pub fn uri_for(&self, hash: &str) -> Result<String> {
        Ok(format!("file://{}", self.get_path(hash)?.display()))
    }

    /// Get file path for a hash
    fn get_path(&self, hash: &str) -> Result<PathBuf> {
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::Validation(format!("Invalid image hash: {}", hash)));
        }

        // Two-level directory structure: images/ab/cd/abcd1234...
        Ok(self.root.join(&hash[0..2]).join(&hash[2..4]).join(hash))
    }

    /// Get image store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Calculate SHA-256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
