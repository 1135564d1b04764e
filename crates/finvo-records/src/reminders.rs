use std::sync::Arc;

use chrono::{DateTime, Utc};
use finvo_core::{AppError, ReminderRecord};
use finvo_storage::{keys, BlobStore, StorageError};

use crate::doc::{load_list, save_list};

/// Result of a create-if-absent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(ReminderRecord),
    /// A reminder for this file already existed; the stored entry is echoed
    /// back and nothing was written.
    AlreadyExists(ReminderRecord),
}

/// Result of a delete-by-file-name call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The document exists but holds no entry for the file; not an error.
    NotFound,
    /// The user has no reminders document at all.
    NoDocument,
}

/// Repository for the per-user pending reminder list.
#[derive(Clone)]
pub struct ReminderRepository {
    store: Arc<dyn BlobStore>,
}

impl ReminderRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// The user's pending reminders; empty if the document is absent.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ReminderRecord>, AppError> {
        let key = keys::reminder_doc_key(user_id);
        load_list(self.store.as_ref(), &key).await
    }

    /// Create a reminder unless one already exists for the file.
    ///
    /// Idempotent: within one user's list `file_name` values are unique, so
    /// a second call with the same file is a no-op that reports the stored
    /// entry.
    #[tracing::instrument(skip(self, record), fields(user_id = %user_id, file_name = %record.file_name))]
    pub async fn create_if_absent(
        &self,
        user_id: &str,
        record: ReminderRecord,
    ) -> Result<CreateOutcome, AppError> {
        let key = keys::reminder_doc_key(user_id);
        let mut reminders: Vec<ReminderRecord> = load_list(self.store.as_ref(), &key).await?;

        if let Some(existing) = reminders.iter().find(|r| r.file_name == record.file_name) {
            tracing::debug!("Reminder already exists, skipping create");
            return Ok(CreateOutcome::AlreadyExists(existing.clone()));
        }

        reminders.push(record.clone());
        save_list(self.store.as_ref(), &key, &reminders).await?;
        tracing::debug!(count = reminders.len(), "Reminder created");
        Ok(CreateOutcome::Created(record))
    }

    /// Remove the reminder for a file, tolerating zero matches.
    ///
    /// `NoDocument` is reported only when the user has no reminders document
    /// at all; an existing document without a matching entry is `NotFound`
    /// and leaves the document untouched.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_name = %file_name))]
    pub async fn delete_by_file_name(
        &self,
        user_id: &str,
        file_name: &str,
    ) -> Result<DeleteOutcome, AppError> {
        let key = keys::reminder_doc_key(user_id);

        let reminders: Vec<ReminderRecord> = match self.store.get(&key).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Storage(format!("Corrupt record document at {}: {}", key, e))
            })?,
            Err(StorageError::NotFound(_)) => return Ok(DeleteOutcome::NoDocument),
            Err(e) => return Err(e.into()),
        };

        let before = reminders.len();
        let remaining: Vec<ReminderRecord> = reminders
            .into_iter()
            .filter(|r| r.file_name != file_name)
            .collect();

        // Uniqueness invariant means at most one entry was filtered out.
        if remaining.len() != before {
            save_list(self.store.as_ref(), &key, &remaining).await?;
            tracing::debug!("Reminder deleted");
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    /// Partition the user's reminders into due and not-due, persist the
    /// not-due remainder, and return the due set for the caller to act on.
    ///
    /// A due reminder is removed from storage in this same step, regardless
    /// of whether any subsequent mail send succeeds.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn sweep_due(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderRecord>, AppError> {
        let key = keys::reminder_doc_key(user_id);
        let reminders: Vec<ReminderRecord> = load_list(self.store.as_ref(), &key).await?;
        if reminders.is_empty() {
            return Ok(Vec::new());
        }

        let (due, not_due): (Vec<ReminderRecord>, Vec<ReminderRecord>) =
            reminders.into_iter().partition(|r| r.reminder_time <= now);

        if !due.is_empty() {
            save_list(self.store.as_ref(), &key, &not_due).await?;
        }

        tracing::debug!(due = due.len(), remaining = not_due.len(), "Reminder sweep");
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finvo_core::policy::parse_utc_timestamp;
    use finvo_storage::LocalBlobStore;
    use tempfile::tempdir;

    async fn repo(dir: &tempfile::TempDir) -> ReminderRepository {
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        ReminderRepository::new(Arc::new(store))
    }

    fn at(s: &str) -> DateTime<Utc> {
        parse_utc_timestamp(s).unwrap()
    }

    fn record(file_name: &str, reminder_time: &str) -> ReminderRecord {
        ReminderRecord {
            file_name: file_name.to_string(),
            created_at: at("2024-01-01T00:00:00Z"),
            due_date: at("2024-12-25T00:00:00Z"),
            reminder_time: at(reminder_time),
        }
    }

    #[tokio::test]
    async fn test_list_is_empty_when_document_absent() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        assert!(repo.list_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_if_absent_is_idempotent() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        let first = repo
            .create_if_absent("u1", record("uploads/u1/a.jpg", "2024-06-01T00:00:00Z"))
            .await
            .unwrap();
        assert!(matches!(first, CreateOutcome::Created(_)));

        let second = repo
            .create_if_absent("u1", record("uploads/u1/a.jpg", "2024-07-01T00:00:00Z"))
            .await
            .unwrap();
        match second {
            CreateOutcome::AlreadyExists(existing) => {
                // The stored entry is untouched by the second call.
                assert_eq!(existing.reminder_time, at("2024-06-01T00:00:00Z"));
            }
            other => panic!("Expected AlreadyExists, got {:?}", other),
        }

        let reminders = repo.list_for_user("u1").await.unwrap();
        assert_eq!(reminders.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_entry() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.create_if_absent("u1", record("uploads/u1/a.jpg", "2024-06-01T00:00:00Z"))
            .await
            .unwrap();
        repo.create_if_absent("u1", record("uploads/u1/b.jpg", "2024-06-01T00:00:00Z"))
            .await
            .unwrap();

        let outcome = repo.delete_by_file_name("u1", "uploads/u1/a.jpg").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let reminders = repo.list_for_user("u1").await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].file_name, "uploads/u1/b.jpg");
    }

    #[tokio::test]
    async fn test_delete_unknown_file_leaves_list_unchanged() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.create_if_absent("u1", record("uploads/u1/a.jpg", "2024-06-01T00:00:00Z"))
            .await
            .unwrap();

        let outcome = repo.delete_by_file_name("u1", "uploads/u1/zzz.jpg").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(repo.list_for_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_without_document_reports_no_document() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        let outcome = repo.delete_by_file_name("u1", "uploads/u1/a.jpg").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NoDocument);
    }

    #[tokio::test]
    async fn test_sweep_partitions_and_persists_remainder() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.create_if_absent("u1", record("uploads/u1/past.jpg", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        repo.create_if_absent("u1", record("uploads/u1/future.jpg", "2024-12-01T00:00:00Z"))
            .await
            .unwrap();

        let now = at("2024-06-01T00:00:00Z");
        let due = repo.sweep_due("u1", now).await.unwrap();

        assert_eq!(due.len(), 1);
        assert_eq!(due[0].file_name, "uploads/u1/past.jpg");
        assert!(due.iter().all(|r| r.reminder_time <= now));

        let remaining = repo.list_for_user("u1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].file_name, "uploads/u1/future.jpg");
        assert!(remaining.iter().all(|r| r.reminder_time > now));
    }

    #[tokio::test]
    async fn test_sweep_due_boundary_is_inclusive() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.create_if_absent("u1", record("uploads/u1/edge.jpg", "2024-06-01T00:00:00Z"))
            .await
            .unwrap();

        // reminder_time == now counts as due.
        let due = repo.sweep_due("u1", at("2024-06-01T00:00:00Z")).await.unwrap();
        assert_eq!(due.len(), 1);
        assert!(repo.list_for_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_due_does_not_rewrite() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;

        repo.create_if_absent("u1", record("uploads/u1/future.jpg", "2024-12-01T00:00:00Z"))
            .await
            .unwrap();

        let due = repo.sweep_due("u1", at("2024-06-01T00:00:00Z")).await.unwrap();
        assert!(due.is_empty());
        assert_eq!(repo.list_for_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_without_document_is_empty() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let due = repo.sweep_due("u1", at("2024-06-01T00:00:00Z")).await.unwrap();
        assert!(due.is_empty());
    }
}
