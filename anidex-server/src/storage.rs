//! Durable media store for uploaded images
//!
//! Files live under `<media_root>/<prefix>/<uuid><.ext>` and are served back
//! under the `/media/` URL prefix.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Logical prefix for uploaded animal photos
pub const ANIMALS_PREFIX: &str = "animals";

/// URL prefix the media root is served under
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Local-disk media store
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `<root>/<relative_path>`, creating parent directories
    ///
    /// Returns the storage-relative path (always `/`-separated).
    pub async fn save(&self, relative_path: &str, bytes: &[u8]) -> std::io::Result<String> {
        let target = self.root.join(relative_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Media file saved");
        Ok(relative_path.to_string())
    }
}

/// Generate a unique filename keeping the original extension
///
/// `photo.JPG` → `<uuid>.JPG`; names without an extension (or dotfiles
/// like `.hidden`) get no suffix.
pub fn unique_filename(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

/// Storage-relative path for an uploaded animal photo
pub fn animal_image_path(filename: &str) -> String {
    format!("{}/{}", ANIMALS_PREFIX, filename)
}

/// Public URL path (origin-relative) for a stored file
pub fn media_url_path(relative_path: &str) -> String {
    format!("{}/{}", MEDIA_URL_PREFIX, relative_path)
}
