use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::timestamp::utc_z;

/// One uploaded invoice document. Appended to the owner's invoice list at
/// upload time; never mutated or deleted by any exposed operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceRecord {
    /// Storage key, format `uploads/{user_id}/{uuid}.{ext}`.
    pub file_name: String,
    /// Field name -> extracted value, opaque to this layer. The schema is
    /// defined by the extraction service; never assume shape.
    pub extracted: BTreeMap<String, Value>,
    #[serde(with = "utc_z")]
    pub created_at: DateTime<Utc>,
    pub reminders_enabled: bool,
}

impl InvoiceRecord {
    /// Build a record for a fresh upload. Reminders are always enabled at
    /// creation in the current design.
    pub fn new(
        file_name: String,
        extracted: BTreeMap<String, Value>,
        created_at: DateTime<Utc>,
    ) -> Self {
        InvoiceRecord {
            file_name,
            extracted,
            created_at,
            reminders_enabled: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    /// Same value as `file_name`; kept for client compatibility.
    pub s3_key: String,
    #[schema(value_type = Object)]
    pub extracted: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<super::reminder::ReminderRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListResponse {
    #[schema(value_type = Vec<Object>)]
    pub invoices: Vec<InvoiceRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResponse {
    pub file_name: String,
    #[schema(value_type = Object)]
    pub extracted: BTreeMap<String, Value>,
}

/// Most-recently-modified non-metadata object under the caller's prefix.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LatestInvoiceResponse {
    pub file_name: String,
    #[serde(with = "utc_z")]
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::parse_utc_timestamp;
    use serde_json::json;

    #[test]
    fn test_new_record_has_reminders_enabled() {
        let record = InvoiceRecord::new(
            "uploads/u1/abc.jpg".to_string(),
            BTreeMap::new(),
            parse_utc_timestamp("2024-01-01T00:00:00Z").unwrap(),
        );
        assert!(record.reminders_enabled);
    }

    #[test]
    fn test_created_at_serializes_with_z_suffix() {
        let record = InvoiceRecord::new(
            "uploads/u1/abc.jpg".to_string(),
            BTreeMap::new(),
            parse_utc_timestamp("2024-01-01T00:00:00Z").unwrap(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["created_at"], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_round_trip_preserves_extracted_fields() {
        let mut extracted = BTreeMap::new();
        extracted.insert("DueDate".to_string(), json!("2024-12-25"));
        extracted.insert("Total".to_string(), json!("129.99"));
        let record = InvoiceRecord::new(
            "uploads/u1/abc.pdf".to_string(),
            extracted,
            parse_utc_timestamp("2024-01-01T00:00:00Z").unwrap(),
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: InvoiceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
