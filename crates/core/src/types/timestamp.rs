//! Lenient timestamp (de)serialization.
//!
//! The marketplace API emits Python `isoformat()` strings. Values written
//! with a timezone are RFC 3339; values written from naive datetimes carry
//! no offset at all and are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse an API timestamp, accepting RFC 3339 or an offset-less ISO 8601
/// datetime (treated as UTC).
#[must_use]
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serialize as RFC 3339.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

/// Deserialize a required timestamp.
///
/// # Errors
///
/// Fails if the value is not a string or cannot be parsed.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
}

/// Optional timestamps. Unparseable or empty strings deserialize as `None`.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Serializer, Utc};

    /// Serialize as RFC 3339 or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp.
    ///
    /// # Errors
    ///
    /// Fails only if the value is neither a string nor `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        Ok(s.as_deref().and_then(super::parse))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse("2025-03-01T10:30:00.123456+06:00").unwrap();
        assert_eq!(dt.hour(), 4);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse("2025-03-01T10:30:00").unwrap();
        assert_eq!(dt.hour(), 10);

        let dt = parse("2025-03-01 10:30:00.5").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
    }
}
