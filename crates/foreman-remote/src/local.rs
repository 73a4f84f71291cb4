//! Folder mirror on the local filesystem, typically a synced OneDrive
//! directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use foreman_core::{AssetStore, FolderOutcome};

use crate::error::{RemoteError, Result};

/// Environment variable naming the mirror root.
pub const ONEDRIVE_ROOT_ENV: &str = "ONEDRIVE_ROOT";

/// [`AssetStore`] that creates plain directories under a root path.
pub struct LocalMirrorStore {
    root: PathBuf,
}

impl LocalMirrorStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slash-separated path below the root, rejecting anything
    /// that would escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut full = self.root.clone();
        for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => full.push(part),
                _ => {
                    return Err(RemoteError::Validation(format!(
                        "invalid path segment '{segment}' in '{path}'"
                    )))
                }
            }
        }
        Ok(full)
    }
}

#[async_trait]
impl AssetStore for LocalMirrorStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn create_folder(&self, path: &str) -> foreman_core::Result<FolderOutcome> {
        let dir = self.resolve(path)?;
        if tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            debug!(dir = %dir.display(), "Local folder already exists");
            return Ok(FolderOutcome::AlreadyExists);
        }
        tokio::fs::create_dir_all(&dir).await.map_err(RemoteError::from)?;
        info!(dir = %dir.display(), "Local folder created");
        Ok(FolderOutcome::Created)
    }

    async fn upload_image(&self, bytes: Vec<u8>, folder: &str, name: &str) -> foreman_core::Result<String> {
        let dir = self.resolve(folder)?;
        let file = self.resolve(&format!("{folder}/{name}.jpg"))?;
        tokio::fs::create_dir_all(&dir).await.map_err(RemoteError::from)?;
        tokio::fs::write(&file, bytes).await.map_err(RemoteError::from)?;

        let absolute = std::path::absolute(&file).map_err(RemoteError::from)?;
        let url = Url::from_file_path(&absolute).map_err(|_| {
            RemoteError::Validation(format!("cannot build a URL for {}", absolute.display()))
        })?;
        debug!(file = %file.display(), "Image written to local mirror");
        Ok(url.to_string())
    }
}
