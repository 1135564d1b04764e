//! Reminder policy engine
//!
//! Pure date arithmetic deciding when a reminder for an uploaded invoice
//! should fire. No I/O and no error outcome: every branch falls back to a
//! computable result.
//!
//! Two distinct policies exist on purpose. The upload path has extraction
//! output available and anchors on the extracted due date; the manual
//! create-reminder path has no extraction output and always schedules 24
//! hours out. They are not unified.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Extraction field consulted for the invoice due date.
pub const DUE_DATE_FIELD: &str = "DueDate";

/// Grace period assumed when no due date could be determined.
const FALLBACK_GRACE: i64 = 1; // days

/// How far ahead of the due date a reminder ideally fires.
const REMINDER_LEAD_HOURS: i64 = 24;

/// Near-immediate delay for short-fuse or overdue documents. Not zero, so a
/// freshly created reminder never fires in the same sweep that observes it.
const NEAR_IMMEDIATE_MINUTES: i64 = 15;

/// Offset for manually created reminders.
const EXPLICIT_REMINDER_HOURS: i64 = 24;

/// Computed schedule for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub due_date: DateTime<Utc>,
    pub reminder_time: DateTime<Utc>,
}

/// Parse an ISO-8601 timestamp string, interpreting naive values as UTC.
///
/// Accepted forms, tried in order:
/// - RFC 3339 with offset or `Z` suffix
/// - naive date-time (`2024-12-25T00:00:00`, fractional seconds allowed)
/// - bare date (`2024-12-25`), taken as UTC midnight
pub fn parse_utc_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    None
}

/// Serialize a UTC instant as ISO-8601 with a literal `Z` suffix.
pub fn format_utc_z(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn due_date_from_fields(extracted: &BTreeMap<String, Value>) -> Option<DateTime<Utc>> {
    match extracted.get(DUE_DATE_FIELD) {
        Some(Value::String(s)) => parse_utc_timestamp(s),
        // Wrong type (number, object, null) counts as "no due date".
        _ => None,
    }
}

/// Compute the reminder schedule for an uploaded invoice.
///
/// The due date comes from the extracted `DueDate` field when parseable,
/// otherwise `now + 1 day`. The reminder ideally fires 24 hours before the
/// due date; if that instant already elapsed, it fires `now + 15 minutes`.
pub fn compute_reminder(
    now: DateTime<Utc>,
    extracted: &BTreeMap<String, Value>,
) -> ReminderSchedule {
    let due_date =
        due_date_from_fields(extracted).unwrap_or_else(|| now + Duration::days(FALLBACK_GRACE));

    let ideal = due_date - Duration::hours(REMINDER_LEAD_HOURS);
    let reminder_time = if ideal < now {
        now + Duration::minutes(NEAR_IMMEDIATE_MINUTES)
    } else {
        ideal
    };

    ReminderSchedule {
        due_date,
        reminder_time,
    }
}

/// Reminder time for the manual create-reminder path, which has no
/// extraction output available: always `now + 24 hours`.
pub fn compute_explicit_reminder(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(EXPLICIT_REMINDER_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        parse_utc_timestamp(s).expect("test timestamp")
    }

    fn fields(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_rfc3339_with_z() {
        assert_eq!(at("2024-06-01T00:00:00Z"), at("2024-06-01T00:00:00+00:00"));
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let dt = parse_utc_timestamp("2024-12-25T00:00:00").unwrap();
        assert_eq!(format_utc_z(dt), "2024-12-25T00:00:00Z");
    }

    #[test]
    fn test_parse_bare_date_as_utc_midnight() {
        let dt = parse_utc_timestamp("2024-12-25").unwrap();
        assert_eq!(format_utc_z(dt), "2024-12-25T00:00:00Z");
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_utc_timestamp("next tuesday").is_none());
        assert!(parse_utc_timestamp("").is_none());
    }

    #[test]
    fn test_missing_due_date_falls_back_to_one_day() {
        let now = at("2024-06-01T12:00:00Z");
        let schedule = compute_reminder(now, &BTreeMap::new());
        assert_eq!(schedule.due_date, now + Duration::days(1));
    }

    #[test]
    fn test_unparseable_due_date_falls_back_to_one_day() {
        let now = at("2024-06-01T12:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!("soonish"))]));
        assert_eq!(schedule.due_date, now + Duration::days(1));
    }

    #[test]
    fn test_wrong_type_due_date_falls_back() {
        let now = at("2024-06-01T12:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!(20241225))]));
        assert_eq!(schedule.due_date, now + Duration::days(1));
    }

    #[test]
    fn test_future_due_date_reminds_24h_before() {
        // DueDate 2024-12-25T00:00:00 (naive), now 2024-12-01.
        let now = at("2024-12-01T00:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!("2024-12-25T00:00:00"))]));
        assert_eq!(format_utc_z(schedule.due_date), "2024-12-25T00:00:00Z");
        assert_eq!(format_utc_z(schedule.reminder_time), "2024-12-24T00:00:00Z");
    }

    #[test]
    fn test_short_fuse_due_date_reminds_in_15_minutes() {
        let now = at("2024-12-01T00:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!("2024-12-01T06:00:00Z"))]));
        assert_eq!(schedule.reminder_time, now + Duration::minutes(15));
    }

    #[test]
    fn test_overdue_due_date_reminds_in_15_minutes() {
        let now = at("2024-12-01T00:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!("2024-11-01T00:00:00Z"))]));
        assert_eq!(schedule.due_date, at("2024-11-01T00:00:00Z"));
        assert_eq!(schedule.reminder_time, now + Duration::minutes(15));
    }

    #[test]
    fn test_ideal_time_exactly_now_is_kept() {
        // Boundary uses strict `<`: ideal == now is not "already elapsed".
        let now = at("2024-12-01T00:00:00Z");
        let schedule = compute_reminder(now, &fields(&[("DueDate", json!("2024-12-02T00:00:00Z"))]));
        assert_eq!(schedule.reminder_time, now);
    }

    #[test]
    fn test_fallback_schedule_reminds_at_now() {
        // due = now + 1 day, ideal = due - 24h = now; strict `<` keeps it at now.
        let now = at("2024-06-01T00:00:00Z");
        let schedule = compute_reminder(now, &BTreeMap::new());
        assert_eq!(schedule.reminder_time, now);
    }

    #[test]
    fn test_explicit_reminder_is_24h_out() {
        let now = at("2024-06-01T00:00:00Z");
        assert_eq!(compute_explicit_reminder(now), now + Duration::hours(24));
    }

    #[test]
    fn test_format_uses_z_suffix_not_offset() {
        let s = format_utc_z(at("2024-01-01T00:00:00Z"));
        assert!(s.ends_with('Z'));
        assert!(!s.contains("+00:00"));
    }
}
