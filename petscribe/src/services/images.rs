//! Image picking
//!
//! `ImagePicker` is the seam to a photo library. The file-based picker
//! imports a chosen local file into the image store; remote URLs pass
//! through untouched.

use crate::error::Result;
use crate::models::PermissionStatus;
use crate::storage::ImageStore;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Ask for access to the photo library
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// URI of the picked image, `None` if the user cancelled
    async fn pick_image(&self) -> Result<Option<String>>;
}

/// Picks a file or URL supplied up front
pub struct FileImagePicker {
    store: ImageStore,
    selection: Option<String>,
}

impl FileImagePicker {
    pub fn new(store: ImageStore, selection: Option<String>) -> Self {
        Self { store, selection }
    }
}

#[async_trait]
impl ImagePicker for FileImagePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn pick_image(&self) -> Result<Option<String>> {
        let Some(selection) = self.selection.as_deref().map(str::trim) else {
            return Ok(None);
        };

        if selection.is_empty() {
            return Ok(None);
        }

        if selection.starts_with("http://") || selection.starts_with("https://") {
            return Ok(Some(selection.to_string()));
        }

        let path = selection.strip_prefix("file://").unwrap_or(selection);
        self.store.import_file(Path::new(path)).await.map(Some)
    }
}
