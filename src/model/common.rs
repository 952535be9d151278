use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub type Id = String;

/// A stored entity in its JSON form, keyed by field name.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Ids are v4 UUIDs; anything else can never match a stored entity.
pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn to_document<T: Serialize>(value: &T) -> anyhow::Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow::anyhow!("Expected a JSON object, got {}", other)),
    }
}

pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Current time in the fixed-width form used for every stored timestamp.
pub fn timestamp_now() -> String {
    format_timestamp(&Utc::now())
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter writing timestamps with a fixed number of fractional
/// digits, so string order in the store equals chronological order.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_lexically() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let later = whole + chrono::Duration::milliseconds(500);

        let a = format_timestamp(&whole);
        let b = format_timestamp(&later);

        assert_eq!(a, "2024-03-01T10:00:00.000000Z");
        assert!(a < b);
    }

    #[test]
    fn test_id_validation() {
        assert!(is_valid_id(&generate_id()));
        assert!(!is_valid_id("5d713995b721c3bb38c1f5d0"));
        assert!(!is_valid_id(""));
    }
}
