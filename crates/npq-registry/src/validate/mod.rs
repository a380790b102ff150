//! Shape validation for registry responses
//!
//! A [`Shape`] is a serde type describing an expected JSON document.
//! [`validate`] is total: it either yields a value conforming to the shape,
//! with unknown fields dropped, or fails with the path of the first field
//! that did not conform.

use npq_core::error::{NpqError, NpqResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A declared response shape.
///
/// Shapes must serialize back into JSON their own deserializer accepts, since
/// validated values are stored as JSON and validated again when read back.
pub trait Shape: DeserializeOwned + Serialize + Send + 'static {
    /// Name reported in validation errors
    const NAME: &'static str;
}

/// Arbitrary JSON; accepts any document unchanged
impl Shape for Value {
    const NAME: &'static str = "JSON";
}

/// Validate a raw JSON value against shape `T`
pub fn validate<T: Shape>(value: Value) -> NpqResult<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        NpqError::Validation {
            shape: T::NAME.to_string(),
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Convert a validated value into the JSON stored in a cache
pub fn to_stored<T: Shape>(value: &T) -> NpqResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        NpqError::storage(format!("Failed to encode {} for storage", T::NAME), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use npq_core::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    struct Outer {
        name: String,
        inner: Inner,
    }

    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    struct Inner {
        count: u32,
    }

    impl Shape for Outer {
        const NAME: &'static str = "Outer";
    }

    #[test]
    fn test_validate_accepts_and_drops_unknown_fields() {
        let value = json!({ "name": "a", "inner": { "count": 1, "extra": true }, "other": [] });
        let outer: Outer = validate(value).unwrap();
        assert_eq!(outer, Outer { name: "a".to_string(), inner: Inner { count: 1 } });

        let stored = to_stored(&outer).unwrap();
        assert_eq!(stored, json!({ "name": "a", "inner": { "count": 1 } }));
    }

    #[test]
    fn test_validate_reports_field_path() {
        let value = json!({ "name": "a", "inner": { "count": "one" } });
        let err = validate::<Outer>(value).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        match err {
            NpqError::Validation { shape, path, .. } => {
                assert_eq!(shape, "Outer");
                assert_eq!(path, "inner.count");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let err = validate::<Outer>(json!({ "inner": { "count": 1 } })).unwrap_err();
        match err {
            NpqError::Validation { message, .. } => assert!(message.contains("name")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_shape_accepts_anything() {
        let value = json!([1, "two", { "three": null }]);
        assert_eq!(validate::<Value>(value.clone()).unwrap(), value);
    }
}
