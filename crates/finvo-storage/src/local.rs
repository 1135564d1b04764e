use crate::traits::{BlobStore, ObjectMeta, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store, used for development and tests.
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore { base_path })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.base_path).ok()?;
        let parts: Vec<&str> = rel.iter().filter_map(|c| c.to_str()).collect();
        Some(parts.join("/"))
    }

    /// Walk all regular files under `dir`, depth first.
    async fn walk_files(&self, dir: PathBuf) -> StorageResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![dir];
        while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::ListFailed(e.to_string())),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::ListFailed(e.to_string()))?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::GetFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, size_bytes = data.len(), "Local storage get");
        Ok(data)
    }

    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::PutFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::PutFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::PutFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, size_bytes = size, "Local storage put");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, "Local storage delete");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectMeta>> {
        // Start the walk at the deepest directory the prefix fully names.
        let dir = match prefix.rfind('/') {
            Some(idx) => self.key_to_path(&prefix[..idx + 1])?,
            None => self.base_path.clone(),
        };

        let mut objects = Vec::new();
        for path in self.walk_files(dir).await? {
            let Some(key) = self.key_for(&path) else {
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            let meta = fs::metadata(&path)
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            let modified = meta
                .modified()
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            objects.push(ObjectMeta {
                key,
                last_modified: DateTime::<Utc>::from(modified),
            });
        }
        Ok(objects)
    }

    async fn list_common_prefixes(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = self.key_to_path(prefix)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::ListFailed(e.to_string())),
        };

        let mut prefixes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            if file_type.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    prefixes.push(format!("{}{}/", prefix, name));
                }
            }
        }
        prefixes.sort();
        Ok(prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let data = b"invoice bytes".to_vec();
        store
            .put("uploads/u1/a.jpg", data.clone(), "image/jpg")
            .await
            .unwrap();

        let fetched = store.get("uploads/u1/a.jpg").await.unwrap();
        assert_eq!(fetched, data);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let result = store.get("uploads/u1/missing.json").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.get("../../../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.exists("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        assert!(store.delete("uploads/u1/none.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_returns_only_prefix_matches() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .put("uploads/u1/a.jpg", b"a".to_vec(), "image/jpg")
            .await
            .unwrap();
        store
            .put("uploads/u1/data.json", b"[]".to_vec(), "application/json")
            .await
            .unwrap();
        store
            .put("uploads/u2/b.jpg", b"b".to_vec(), "image/jpg")
            .await
            .unwrap();

        let mut keys: Vec<String> = store
            .list("uploads/u1/")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["uploads/u1/a.jpg", "uploads/u1/data.json"]);
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        assert!(store.list("uploads/nobody/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_common_prefixes_enumerates_users() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .put("uploads/alice/a.jpg", b"a".to_vec(), "image/jpg")
            .await
            .unwrap();
        store
            .put("uploads/bob/reminders.json", b"[]".to_vec(), "application/json")
            .await
            .unwrap();

        let prefixes = store.list_common_prefixes("uploads/").await.unwrap();
        assert_eq!(prefixes, vec!["uploads/alice/", "uploads/bob/"]);
    }
}
