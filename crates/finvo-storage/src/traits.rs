//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must
//! implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finvo_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Put failed: {0}")]
    PutFailed(String),

    #[error("Get failed: {0}")]
    GetFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Listed object with its storage-reported modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Blob store abstraction trait
///
/// All storage backends (S3-compatible, local filesystem) must implement
/// this trait. The record repositories and handlers work against it without
/// coupling to backend details.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch an object's bytes. `StorageError::NotFound` when the key does
    /// not exist.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Store an object, replacing any existing content at the key.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List all objects under a prefix with their last-modified times.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectMeta>>;

    /// List the immediate child prefixes under a prefix (delimiter `/`),
    /// e.g. `uploads/` -> `["uploads/alice/", "uploads/bob/"]`. Used to
    /// enumerate users.
    async fn list_common_prefixes(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
