//! Cover image storage under the uploads directory

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::AppResult;

/// Filesystem store keyed by the file name held in the book row.
///
/// Writes and removals are not coordinated with database transactions.
#[derive(Clone, Debug)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a cover inside the uploads directory
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Create the uploads directory if missing
    pub async fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Decode client-supplied base-64 content
    pub fn decode(content: &str) -> AppResult<Vec<u8>> {
        Ok(STANDARD.decode(content.trim())?)
    }

    /// Read a cover as base-64; `None` when the file does not exist
    pub async fn read_base64(&self, file_name: &str) -> AppResult<Option<String>> {
        match fs::read(self.path_for(file_name)).await {
            Ok(bytes) => Ok(Some(STANDARD.encode(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> AppResult<()> {
        self.ensure_root().await?;
        fs::write(self.path_for(file_name), bytes).await?;
        Ok(())
    }

    /// Remove a cover; returns whether a file was there
    pub async fn remove(&self, file_name: &str) -> AppResult<bool> {
        match fs::remove_file(self.path_for(file_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn temp_store() -> ImageStore {
    ImageStore::new(std::env::temp_dir().join(format!("bookstore-uploads-{}", uuid::Uuid::new_v4())))
}
