//! Centralized storage key construction.
//!
//! Every key the system reads or writes is built here. The per-user prefix
//! is the sole access-control boundary enforced by handlers, so key shape
//! consistency matters.

use uuid::Uuid;

/// Root prefix for all user data.
pub const UPLOADS_ROOT: &str = "uploads/";

/// File name of the per-user invoice metadata document.
pub const INVOICE_DOC: &str = "data.json";

/// File name of the per-user reminders document.
pub const REMINDER_DOC: &str = "reminders.json";

/// Prefix owning all of one user's objects: `uploads/{user_id}/`.
pub fn user_prefix(user_id: &str) -> String {
    format!("{}{}/", UPLOADS_ROOT, user_id)
}

/// Key of the user's invoice metadata document.
pub fn invoice_doc_key(user_id: &str) -> String {
    format!("{}{}", user_prefix(user_id), INVOICE_DOC)
}

/// Key of the user's reminders document.
pub fn reminder_doc_key(user_id: &str) -> String {
    format!("{}{}", user_prefix(user_id), REMINDER_DOC)
}

/// Fresh storage key for an uploaded document.
pub fn new_upload_key(user_id: &str, extension: &str) -> String {
    format!("{}{}.{}", user_prefix(user_id), Uuid::new_v4(), extension)
}

/// Whether a key names one of the per-user JSON metadata documents rather
/// than an uploaded file. Used by latest-invoice to skip them.
pub fn is_metadata_key(key: &str) -> bool {
    key.ends_with(&format!("/{}", INVOICE_DOC)) || key.ends_with(&format!("/{}", REMINDER_DOC))
}

/// The sole authorization rule: a user owns exactly the keys under their
/// prefix.
pub fn user_owns_key(user_id: &str, key: &str) -> bool {
    key.starts_with(&user_prefix(user_id))
}

/// Extract the user id from a common prefix like `uploads/{user_id}/`.
pub fn user_id_from_prefix(prefix: &str) -> Option<&str> {
    let rest = prefix.strip_prefix(UPLOADS_ROOT)?;
    let user_id = rest.strip_suffix('/').unwrap_or(rest);
    if user_id.is_empty() || user_id.contains('/') {
        None
    } else {
        Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prefix_shape() {
        assert_eq!(user_prefix("abc-123"), "uploads/abc-123/");
        assert_eq!(invoice_doc_key("abc-123"), "uploads/abc-123/data.json");
        assert_eq!(reminder_doc_key("abc-123"), "uploads/abc-123/reminders.json");
    }

    #[test]
    fn test_new_upload_key_is_under_user_prefix() {
        let key = new_upload_key("u1", "jpg");
        assert!(key.starts_with("uploads/u1/"));
        assert!(key.ends_with(".jpg"));
        assert_ne!(new_upload_key("u1", "jpg"), key);
    }

    #[test]
    fn test_metadata_keys_are_recognized() {
        assert!(is_metadata_key("uploads/u1/data.json"));
        assert!(is_metadata_key("uploads/u1/reminders.json"));
        assert!(!is_metadata_key("uploads/u1/abc.pdf"));
        assert!(!is_metadata_key("uploads/u1/not-data.json.pdf"));
    }

    #[test]
    fn test_ownership_requires_exact_prefix() {
        assert!(user_owns_key("u1", "uploads/u1/abc.jpg"));
        assert!(!user_owns_key("u1", "uploads/u2/abc.jpg"));
        // Prefix must include the trailing slash so "u1" never matches "u10".
        assert!(!user_owns_key("u1", "uploads/u10/abc.jpg"));
    }

    #[test]
    fn test_user_id_from_prefix() {
        assert_eq!(user_id_from_prefix("uploads/u1/"), Some("u1"));
        assert_eq!(user_id_from_prefix("uploads/u1"), Some("u1"));
        assert_eq!(user_id_from_prefix("uploads/"), None);
        assert_eq!(user_id_from_prefix("other/u1/"), None);
        assert_eq!(user_id_from_prefix("uploads/u1/nested/"), None);
    }
}
