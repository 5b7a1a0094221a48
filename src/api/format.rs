use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Server-managed fields; never accepted from a request body.
const SYSTEM_FIELDS: &[&str] = &["id", "isActive", "createdAt", "updatedAt"];

/// Unwrap a JSON body that must be an object, dropping system fields.
pub fn body_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Json(value) = body.map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::validation("Request body must be valid JSON")
    })?;

    match value {
        Value::Object(map) => Ok(build_attributes(map)),
        _ => Err(ApiError::validation("Request body must be a JSON object")),
    }
}

fn build_attributes(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(k, _)| !SYSTEM_FIELDS.contains(&k.as_str()))
        .collect()
}

/// Three-state field read: absent → `None`, `null` → `Some(None)`,
/// otherwise the typed value. A present value of the wrong shape is a 400.
pub fn optional_field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    expected: &str,
) -> Result<Option<Option<T>>, ApiError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(value) => serde_json::from_value(value.clone())
            .map(|v| Some(Some(v)))
            .map_err(|_| ApiError::validation(format!("{} must be {}", key, expected))),
    }
}

/// Query-string flag: `true`/`1` enable it, anything else leaves it off.
pub fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_system_fields() {
        let map = body_object(Ok(Json(json!({
            "id": "forged",
            "isActive": false,
            "name": "Yamada",
            "createdAt": "2020-01-01T00:00:00Z",
        }))))
        .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["name"], "Yamada");
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let err = body_object(Ok(Json(json!(["a"])))).unwrap_err();
        assert_eq!(err, ApiError::validation("Request body must be a JSON object"));
    }

    #[test]
    fn optional_field_three_states() {
        let map = json!({"a": ["x"], "b": null, "c": 5}).as_object().cloned().unwrap();
        let a: Option<Option<Vec<String>>> = optional_field(&map, "a", "a list").unwrap();
        assert_eq!(a, Some(Some(vec!["x".to_string()])));
        let b: Option<Option<Vec<String>>> = optional_field(&map, "b", "a list").unwrap();
        assert_eq!(b, Some(None));
        let missing: Option<Option<Vec<String>>> = optional_field(&map, "zz", "a list").unwrap();
        assert_eq!(missing, None);
        let err = optional_field::<Vec<String>>(&map, "c", "an array of strings").unwrap_err();
        assert_eq!(err.message(), "c must be an array of strings");
    }

    #[test]
    fn flags() {
        assert!(flag(Some("true")));
        assert!(flag(Some("1")));
        assert!(!flag(Some("yes")));
        assert!(!flag(None));
    }
}
