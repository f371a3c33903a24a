//! Identity and shape normalization.
//!
//! Both adapters return documents in one shape: the payload fields plus the
//! identity under [`ID_FIELD`] and timestamps under [`CREATED_AT_FIELD`] /
//! [`UPDATED_AT_FIELD`]. On the way in, those reserved fields are stripped so
//! they never end up inside a stored payload; on the way out, the physical
//! columns (or driver-managed fields) are merged back in.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::document::Document;

/// Backend-independent identity field.
pub const ID_FIELD: &str = "_id";

/// Backend-independent creation timestamp field.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Backend-independent last-modification timestamp field.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Fields the adapters own; callers never persist these themselves.
pub const RESERVED_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Strip reserved fields from a payload before it is persisted.
pub fn strip_reserved(doc: &mut Document) {
    for field in RESERVED_FIELDS {
        doc.remove(field);
    }
}

/// Render a timestamp the way both adapters expose it.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Merge relational identity and timestamp columns into a payload.
///
/// The payload arrives as the raw JSONB value; anything other than a JSON
/// object (possible only through `execute_raw` misuse) is replaced by an
/// empty document so the identity is still returned.
pub fn normalize_row(
    id: i64,
    payload: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Document {
    let mut doc = match payload {
        Value::Object(map) => map,
        _ => Document::new(),
    };
    doc.insert(ID_FIELD.to_string(), Value::from(id));
    doc.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(format_timestamp(created_at)),
    );
    doc.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(format_timestamp(updated_at)),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_strip_reserved() {
        let mut doc = Document::new();
        doc.insert("_id".into(), json!(42));
        doc.insert("name".into(), json!("alice"));
        doc.insert("createdAt".into(), json!("2020-01-01T00:00:00Z"));
        doc.insert("updatedAt".into(), json!("2020-01-01T00:00:00Z"));

        strip_reserved(&mut doc);

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("name"), Some(&json!("alice")));
    }

    #[test]
    fn test_normalize_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let payload = json!({"name": "bob", "age": 33});

        let doc = normalize_row(7, payload.clone(), ts, ts);
        assert_eq!(doc.get(ID_FIELD), Some(&json!(7)));
        assert_eq!(doc.get("name"), Some(&json!("bob")));
        assert_eq!(
            doc.get(CREATED_AT_FIELD),
            Some(&json!("2024-05-01T12:30:00.000Z"))
        );

        // Stripping the merged fields restores the original payload.
        let mut stripped = doc;
        strip_reserved(&mut stripped);
        assert_eq!(Value::Object(stripped), payload);
    }

    #[test]
    fn test_non_object_payload_still_carries_identity() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let doc = normalize_row(3, json!("scalar"), ts, ts);
        assert_eq!(doc.get(ID_FIELD), Some(&json!(3)));
    }
}
