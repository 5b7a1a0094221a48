//! JSON field codec for structured values persisted in nullable text columns.
//!
//! Decoding is total: a missing, blank or malformed column always yields the
//! caller's default. Encoding never produces the literal string `"null"`; an
//! absent (or null-like) value is persisted as SQL `NULL`.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Decode a persisted column into `T`, falling back to `default`.
pub fn decode<T: DeserializeOwned>(raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    if raw.trim().is_empty() {
        return default;
    }

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Malformed JSON field, using default: {}", e);
            default
        }
    }
}

/// Encode a value for persistence. `None` and values serializing to JSON
/// `null` become `None` (SQL `NULL`).
pub fn encode<T: Serialize + ?Sized>(value: Option<&T>) -> Option<String> {
    let value = serde_json::to_value(value?).ok()?;
    if value.is_null() {
        return None;
    }
    Some(value.to_string())
}

/// Decode every string field of `record` named in `field_defaults`.
///
/// Returns a shallow copy; the input map is left untouched. Fields that are
/// absent or not strings are copied as-is.
pub fn decode_fields(record: &Map<String, Value>, field_defaults: &Map<String, Value>) -> Map<String, Value> {
    let mut decoded = record.clone();
    for (key, default) in field_defaults {
        if let Some(Value::String(raw)) = record.get(key) {
            decoded.insert(key.clone(), decode(Some(raw.as_str()), default.clone()));
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn absent_or_blank_yields_default() {
        let default = vec!["a".to_string()];
        assert_eq!(decode(None, default.clone()), default);
        assert_eq!(decode(Some(""), default.clone()), default);
        assert_eq!(decode(Some("   "), default.clone()), default);
    }

    #[test]
    fn malformed_yields_default() {
        let default: Vec<String> = vec![];
        for raw in ["[", "{\"a\":", "not json", "42", "{\"k\": 1}", "null"] {
            assert_eq!(decode(Some(raw), default.clone()), default, "raw = {raw}");
        }
    }

    #[test]
    fn list_round_trips() {
        let ids = vec!["w-1".to_string(), "w-3".to_string(), "w-2".to_string()];
        let raw = encode(Some(&ids)).unwrap();
        assert_eq!(raw, r#"["w-1","w-3","w-2"]"#);
        assert_eq!(decode::<Vec<String>>(Some(&raw), vec![]), ids);
    }

    #[test]
    fn absent_and_null_like_encode_to_none() {
        assert_eq!(encode::<Vec<String>>(None), None);
        assert_eq!(encode(Some(&Value::Null)), None);
        assert_eq!(encode(Some(&Option::<u32>::None)), None);
        assert_eq!(encode(Some(&Vec::<String>::new())).as_deref(), Some("[]"));
    }

    #[test]
    fn decode_fields_copies_and_leaves_input_alone() {
        let record = obj(json!({
            "id": "default",
            "displayOrder": "[\"b\",\"a\"]",
            "hiddenMemberIds": "{broken",
            "totalMembers": 20,
        }));
        let snapshot = record.clone();
        let defaults = obj(json!({
            "displayOrder": [],
            "hiddenMemberIds": [],
            "totalMembers": 1,
            "missing": [],
        }));

        let decoded = decode_fields(&record, &defaults);

        assert_eq!(record, snapshot);
        assert_eq!(decoded["displayOrder"], json!(["b", "a"]));
        assert_eq!(decoded["hiddenMemberIds"], json!([]));
        assert_eq!(decoded["totalMembers"], json!(20));
        assert!(decoded.get("missing").is_none());
        assert_eq!(decoded["id"], json!("default"));
    }
}
