//! Where uploaded document bytes live.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Stores `bytes` and returns the pointer recorded on the document.
    async fn save(&self, user_id: i32, extension: &str, bytes: &[u8]) -> AppResult<String>;

    /// Removes a stored object. Missing objects are not an error.
    async fn delete(&self, storage_path: &str) -> AppResult<()>;
}

/// Files under a local directory, laid out as `{user_id}/{uuid}.{ext}`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a stored pointer, refusing anything that would escape the root.
    fn resolve(&self, storage_path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(storage_path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::bad_request("Invalid storage path"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStorage for LocalStorage {
    async fn save(&self, user_id: i32, extension: &str, bytes: &[u8]) -> AppResult<String> {
        let storage_path = format!("{}/{}.{}", user_id, Uuid::new_v4(), extension);
        let full = self.resolve(&storage_path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        tracing::debug!(path = %full.display(), size = bytes.len(), "Stored upload");
        Ok(storage_path)
    }

    async fn delete(&self, storage_path: &str) -> AppResult<()> {
        let full = self.resolve(storage_path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let pointer = storage.save(7, "txt", b"hello").await.unwrap();
        assert!(pointer.starts_with("7/"));
        assert!(pointer.ends_with(".txt"));

        let on_disk = dir.path().join(&pointer);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"hello");

        storage.delete(&pointer).await.unwrap();
        assert!(!on_disk.exists());
        // second delete is a no-op
        storage.delete(&pointer).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.delete("../etc/passwd").await.is_err());
        assert!(storage.delete("/etc/passwd").await.is_err());
    }
}
