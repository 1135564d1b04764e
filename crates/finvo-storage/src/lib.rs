//! Finvo Storage Library
//!
//! Blob-store abstraction and implementations for finvo. It includes the
//! `BlobStore` trait and backends for S3-compatible object storage and the
//! local filesystem.
//!
//! # Key layout
//!
//! All user data lives under the `uploads/{user_id}/` prefix:
//!
//! - uploaded documents: `uploads/{user_id}/{uuid}.{ext}`
//! - invoice metadata: `uploads/{user_id}/data.json`
//! - pending reminders: `uploads/{user_id}/reminders.json`
//!
//! Keys must not contain `..` or a leading `/`. Key construction is
//! centralized in the `keys` module so all callers stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_blob_store;
pub use local::LocalBlobStore;
pub use s3::S3BlobStore;
pub use traits::{BlobStore, ObjectMeta, StorageError, StorageResult};
