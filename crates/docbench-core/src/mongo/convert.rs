//! BSON/JSON conversion.
//!
//! The adapter API speaks `serde_json`; the driver speaks BSON. Identity and
//! timestamp values get dedicated handling so both adapters expose the same
//! document shape: ObjectIds become 24-hex strings and BSON datetimes become
//! RFC 3339 strings.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId, Bson};
use serde_json::{Number, Value};

use crate::document::Document;
use crate::error::AdapterError;
use crate::Result;

/// Render a BSON datetime with the same format the relational adapter uses.
pub fn bson_datetime_to_string(datetime: bson::DateTime) -> String {
    let chrono_time = DateTime::<Utc>::from_timestamp_millis(datetime.timestamp_millis())
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH);
    crate::normalize::format_timestamp(chrono_time)
}

/// Convert a JSON value into BSON.
pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut doc = bson::Document::new();
            for (key, item) in map {
                doc.insert(key.clone(), json_to_bson(item));
            }
            Bson::Document(doc)
        }
    }
}

/// Convert a JSON document into a BSON document.
pub fn json_map_to_document(map: &Document) -> bson::Document {
    let mut doc = bson::Document::new();
    for (key, value) in map {
        doc.insert(key.clone(), json_to_bson(value));
    }
    doc
}

/// Convert BSON into a JSON value.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(bson_datetime_to_string(dt)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(document_to_json_map(doc)),
        // Remaining BSON types do not occur in documents this crate writes;
        // relaxed extended JSON keeps them readable if they appear.
        other => other.into_relaxed_extjson(),
    }
}

/// Convert a BSON document into a JSON document.
pub fn document_to_json_map(doc: bson::Document) -> Document {
    let mut map = Document::new();
    for (key, value) in doc {
        map.insert(key, bson_to_json(value));
    }
    map
}

/// Parse an identity value returned in `_id` back into an ObjectId.
pub fn parse_object_id(value: &Value) -> Result<ObjectId> {
    let hex = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .ok_or_else(|| AdapterError::Translation(format!("invalid identity value {}", value)))?,
        other => {
            return Err(AdapterError::Translation(format!(
                "invalid identity value {}",
                other
            )))
        }
    };
    ObjectId::parse_str(hex)
        .map_err(|_| AdapterError::Translation(format!("invalid identity value '{}'", hex)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_preserves_types() {
        let map = match json!({"name": "alice", "age": 30, "score": 1.5, "active": true, "tags": ["a", "b"], "address": {"city": "Berlin"}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let doc = json_map_to_document(&map);
        assert_eq!(doc.get_str("name").unwrap(), "alice");
        assert_eq!(doc.get_i64("age").unwrap(), 30);
        assert_eq!(doc.get_f64("score").unwrap(), 1.5);

        let back = document_to_json_map(doc);
        assert_eq!(Value::Object(back), Value::Object(map));
    }

    #[test]
    fn test_object_id_becomes_hex_string() {
        let oid = ObjectId::new();
        let json = bson_to_json(Bson::ObjectId(oid));
        assert_eq!(json, Value::String(oid.to_hex()));

        let parsed = parse_object_id(&json).unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(parse_object_id(&json!("nope")).is_err());
        assert!(parse_object_id(&json!(42)).is_err());
    }

    #[test]
    fn test_datetime_matches_relational_format() {
        let dt = bson::DateTime::from_millis(1_714_565_400_000);
        assert_eq!(bson_datetime_to_string(dt), "2024-05-01T12:10:00.000Z");
    }
}
