use std::sync::Arc;

use finvo_core::{AppError, InvoiceRecord};
use finvo_storage::{keys, BlobStore};

use crate::doc::{load_list, save_list};

/// Repository for the append-only per-user invoice list.
#[derive(Clone)]
pub struct InvoiceRepository {
    store: Arc<dyn BlobStore>,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Append a record to the user's invoice list.
    ///
    /// Read-modify-write of the whole document; not atomic across concurrent
    /// callers (last writer wins).
    #[tracing::instrument(skip(self, record), fields(user_id = %user_id, file_name = %record.file_name))]
    pub async fn append(&self, user_id: &str, record: InvoiceRecord) -> Result<(), AppError> {
        let key = keys::invoice_doc_key(user_id);
        let mut invoices: Vec<InvoiceRecord> = load_list(self.store.as_ref(), &key).await?;
        invoices.push(record);
        save_list(self.store.as_ref(), &key, &invoices).await?;
        tracing::debug!(count = invoices.len(), "Invoice record appended");
        Ok(())
    }

    /// The user's invoice list; empty if the document is absent.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, AppError> {
        let key = keys::invoice_doc_key(user_id);
        load_list(self.store.as_ref(), &key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finvo_core::policy::parse_utc_timestamp;
    use finvo_storage::LocalBlobStore;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    async fn repo(dir: &tempfile::TempDir) -> InvoiceRepository {
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        InvoiceRepository::new(Arc::new(store))
    }

    fn record(file_name: &str) -> InvoiceRecord {
        InvoiceRecord::new(
            file_name.to_string(),
            BTreeMap::new(),
            parse_utc_timestamp("2024-01-01T00:00:00Z").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_list_is_empty_when_document_absent() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        assert!(repo.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_accumulates_in_order() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.append("u1", record("uploads/u1/a.jpg")).await.unwrap();
        repo.append("u1", record("uploads/u1/b.jpg")).await.unwrap();

        let invoices = repo.list("u1").await.unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].file_name, "uploads/u1/a.jpg");
        assert_eq!(invoices[1].file_name, "uploads/u1/b.jpg");
    }

    #[tokio::test]
    async fn test_lists_are_per_user() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.append("u1", record("uploads/u1/a.jpg")).await.unwrap();

        assert_eq!(repo.list("u1").await.unwrap().len(), 1);
        assert!(repo.list("u2").await.unwrap().is_empty());
    }
}
