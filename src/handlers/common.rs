use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Deserializes a three-state numeric patch field: an absent field means
/// "keep" (handled by `#[serde(default)]` on the field), an explicit null or
/// a blank string means "unset", anything else must parse as a number.
///
/// Blank form input must become null, never zero: zero stock and untracked
/// stock are different states.
pub fn patch_decimal<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    decimal_from_patch(&value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// As [`patch_decimal`], for integer fields.
pub fn patch_i32<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    i32_from_patch(&value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn decimal_from_patch(value: &JsonValue) -> Result<Option<Decimal>, String> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.trim().is_empty() => Ok(None),
        JsonValue::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a valid number", s)),
        JsonValue::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a valid number", n)),
        other => Err(format!("expected number, string or null, got {}", other)),
    }
}

fn i32_from_patch(value: &JsonValue) -> Result<Option<i32>, String> {
    let parsed = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::String(s) if s.trim().is_empty() => return Ok(None),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not a valid integer", s))?,
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("'{}' is not a valid integer", n))?,
        other => return Err(format!("expected integer, string or null, got {}", other)),
    };

    i32::try_from(parsed)
        .map(Some)
        .map_err(|_| format!("{} is out of range", parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "patch_decimal")]
        price: Option<Option<Decimal>>,
        #[serde(default, deserialize_with = "patch_i32")]
        stock: Option<Option<i32>>,
    }

    #[test]
    fn absent_fields_mean_keep() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.price, None);
        assert_eq!(patch.stock, None);
    }

    #[test]
    fn explicit_null_means_unset() {
        let patch: Patch = serde_json::from_str(r#"{"price": null, "stock": null}"#).unwrap();
        assert_eq!(patch.price, Some(None));
        assert_eq!(patch.stock, Some(None));
    }

    #[test]
    fn blank_string_means_unset_not_zero() {
        let patch: Patch = serde_json::from_str(r#"{"price": "", "stock": "  "}"#).unwrap();
        assert_eq!(patch.price, Some(None));
        assert_eq!(patch.stock, Some(None));
    }

    #[test]
    fn numbers_and_numeric_strings_parse() {
        let patch: Patch = serde_json::from_str(r#"{"price": "19.99", "stock": 7}"#).unwrap();
        assert_eq!(patch.price, Some(Some(dec!(19.99))));
        assert_eq!(patch.stock, Some(Some(7)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Patch>(r#"{"stock": "plenty"}"#).is_err());
        assert!(serde_json::from_str::<Patch>(r#"{"price": []}"#).is_err());
        assert!(serde_json::from_str::<Patch>(r#"{"stock": 2147483648}"#).is_err());
    }
}
