use crate::{BlobStore, LocalBlobStore, S3BlobStore, StorageError, StorageResult};
use finvo_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a blob store backend based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend() {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from);
            let endpoint = config.s3_endpoint().map(String::from);

            let store = S3BlobStore::new(bucket, region, endpoint)?;
            Ok(Arc::new(store))
        }

        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;

            let store = LocalBlobStore::new(base_path).await?;
            Ok(Arc::new(store))
        }
    }
}
