//! Serde glue for the stored timestamp format.
//!
//! Record documents persist timestamps as ISO-8601 UTC strings with a
//! literal `Z` suffix. Deserialization is lenient and accepts naive values
//! (interpreted as UTC) so documents written by earlier tooling still load.

pub mod utc_z {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::policy::{format_utc_z, parse_utc_timestamp};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_utc_z(*dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_utc_timestamp(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid UTC timestamp: {}", s)))
    }
}
