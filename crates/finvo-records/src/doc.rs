//! Load/save helpers for the per-user JSON array documents.

use finvo_core::AppError;
use finvo_storage::{BlobStore, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) const DOC_CONTENT_TYPE: &str = "application/json";

/// Load a JSON array document. A missing key yields an empty list.
pub(crate) async fn load_list<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Vec<T>, AppError> {
    match store.get(key).await {
        Ok(bytes) => {
            let list = serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Storage(format!("Corrupt record document at {}: {}", key, e))
            })?;
            Ok(list)
        }
        Err(StorageError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Persist the full list, replacing the previous document.
pub(crate) async fn save_list<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    list: &[T],
) -> Result<(), AppError> {
    let bytes = serde_json::to_vec(list)
        .map_err(|e| AppError::Internal(format!("Failed to serialize record document: {}", e)))?;
    store.put(key, bytes, DOC_CONTENT_TYPE).await?;
    Ok(())
}
