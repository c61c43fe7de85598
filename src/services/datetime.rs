//! Timestamp handling for the booking API.
//!
//! The API sends booking times either as RFC 3339 strings or as local date
//! times without an offset (`2024-06-01T10:00:00`). Both are read as UTC.
//! Outgoing timestamps are written without an offset, which is what the API
//! accepts in bodies and query strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an API timestamp.
///
/// Returns `None` if `value` is neither RFC 3339 nor an offset-less date time.
#[must_use]
pub fn parse_api_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp the way the API expects it (`YYYY-MM-DDTHH:MM:SS`).
#[must_use]
pub fn format_api_datetime(value: &DateTime<Utc>) -> String {
    value.format(WIRE_FORMAT).to_string()
}

/// Formats a calendar date the way the API expects it (`YYYY-MM-DD`).
#[must_use]
pub fn format_api_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_api_datetime(value))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_api_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// The same conventions for optional fields.
pub(crate) mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_api_datetime(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}
