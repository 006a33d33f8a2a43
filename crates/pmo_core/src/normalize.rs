//! Timestamp normalization between documents and typed records.
//!
//! Records carry `DateTime<Utc>`; documents (and the wire) carry ISO-8601
//! strings. Writes always render RFC 3339 with an explicit offset. Reads parse
//! any string found under one of [`TIMESTAMP_FIELDS`] and fail with
//! [`NormalizeError::Timestamp`] when the value is not a timestamp.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ports::Document;

/// Field names that hold timestamps in at least one collection.
///
/// Budget lines reuse `plan` and `fc` for amounts; only string values are
/// treated as timestamps, so numbers under these names pass through.
pub const TIMESTAMP_FIELDS: &[&str] = &["date", "plan", "fc", "due"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("field `{field}` holds an invalid timestamp: {value:?}")]
    Timestamp { field: String, value: String },

    #[error("record did not serialize to a JSON object")]
    NotAnObject,

    #[error("document does not match record shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Years that render as four digits and therefore parse back as RFC 3339.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse the ISO-8601 variants accepted on the wire and in storage.
///
/// Offset-less values are taken as UTC; a bare date means midnight UTC.
/// Instants outside years 0000-9999 (after conversion to UTC) are rejected.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw.trim()).filter(|dt| YEAR_RANGE.contains(&dt.year()))
}

fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical storage/wire form, e.g. `2025-01-01T00:00:00+00:00`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Serialize a record into a storage document.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, NormalizeError> {
    match serde_json::to_value(record)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(NormalizeError::NotAnObject),
    }
}

/// Rewrite every string timestamp field in `doc` to canonical form.
pub fn normalize_timestamps(collection: &str, doc: &mut Document) -> Result<(), NormalizeError> {
    for field in TIMESTAMP_FIELDS {
        if let Some(Value::String(raw)) = doc.get_mut(*field) {
            match parse_timestamp(raw) {
                Some(dt) => *raw = format_timestamp(&dt),
                None => {
                    tracing::warn!(
                        collection,
                        field = *field,
                        value = raw.as_str(),
                        "stored timestamp could not be parsed"
                    );
                    return Err(NormalizeError::Timestamp {
                        field: (*field).to_string(),
                        value: raw.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Decode a storage document back into a typed record.
pub fn from_document<T: DeserializeOwned>(
    collection: &str,
    mut doc: Document,
) -> Result<T, NormalizeError> {
    normalize_timestamps(collection, &mut doc)?;
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// `#[serde(with = "iso8601")]` for `DateTime<Utc>` fields.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw:?}"))
        })
    }

    /// Same as the parent module, for `Option<DateTime<Utc>>`.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::super::parse_timestamp(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw:?}"))
                }),
            }
        }
    }
}
