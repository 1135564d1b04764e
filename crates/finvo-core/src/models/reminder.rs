use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::timestamp::utc_z;
use crate::policy::ReminderSchedule;

/// One pending reminder for a stored document. At most one active reminder
/// exists per `file_name` within a user's list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ReminderRecord {
    /// Foreign key to an invoice record's `file_name`.
    pub file_name: String,
    #[serde(with = "utc_z")]
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    /// The deadline the reminder is about.
    #[serde(with = "utc_z")]
    #[schema(value_type = String)]
    pub due_date: DateTime<Utc>,
    /// When the reminder should fire.
    #[serde(with = "utc_z")]
    #[schema(value_type = String)]
    pub reminder_time: DateTime<Utc>,
}

impl ReminderRecord {
    pub fn from_schedule(
        file_name: String,
        created_at: DateTime<Utc>,
        schedule: ReminderSchedule,
    ) -> Self {
        ReminderRecord {
            file_name,
            created_at,
            due_date: schedule.due_date,
            reminder_time: schedule.reminder_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReminderListResponse {
    pub reminders: Vec<ReminderRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReminderResponse {
    pub message: String,
    pub reminder: ReminderRecord,
    /// True when a reminder for this file already existed; creation is then
    /// a no-op and `reminder` echoes the stored entry.
    pub already_existed: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteReminderResponse {
    pub message: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::parse_utc_timestamp;
    use serde_json::json;

    #[test]
    fn test_serializes_timestamps_with_z_suffix() {
        let record = ReminderRecord {
            file_name: "uploads/u1/abc.jpg".to_string(),
            created_at: parse_utc_timestamp("2024-01-01T00:00:00Z").unwrap(),
            due_date: parse_utc_timestamp("2024-12-25T00:00:00Z").unwrap(),
            reminder_time: parse_utc_timestamp("2024-12-24T00:00:00Z").unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["due_date"], json!("2024-12-25T00:00:00Z"));
        assert_eq!(value["reminder_time"], json!("2024-12-24T00:00:00Z"));
    }

    #[test]
    fn test_deserializes_naive_timestamps_as_utc() {
        // Documents written by earlier tooling may carry naive timestamps.
        let record: ReminderRecord = serde_json::from_value(json!({
            "file_name": "uploads/u1/abc.jpg",
            "created_at": "2024-01-01T00:00:00",
            "due_date": "2024-12-25T00:00:00",
            "reminder_time": "2024-12-24T00:00:00"
        }))
        .unwrap();
        assert_eq!(
            record.due_date,
            parse_utc_timestamp("2024-12-25T00:00:00Z").unwrap()
        );
    }
}
