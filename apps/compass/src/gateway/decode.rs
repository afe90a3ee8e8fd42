//! Two-stage decoding of remote generation responses.
//!
//! The service wraps its payload in an envelope whose `body` is either an
//! object or a JSON-encoded string, and that string is sometimes wrapped in
//! Markdown code fences. Decoding is split into explicit stages so callers
//! and tests can tell which one failed:
//!
//! 1. [`decode_outer`]: strip fences, parse the envelope.
//! 2. [`decode_inner`]: unwrap `body` (string → parse again, object → as is,
//!    absent → the envelope itself is the payload).
//! 3. [`take_field`]: pull the expected top-level field out of the payload.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Outer envelope is not valid JSON: {0}")]
    Outer(serde_json::Error),

    #[error("Inner body is not valid JSON: {0}")]
    Inner(serde_json::Error),

    #[error("Payload is missing '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' has an unexpected shape: {source}")]
    Shape {
        field: &'static str,
        source: serde_json::Error,
    },
}

/// Strips ```json ... ``` or ``` ... ``` code fences.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

pub fn decode_outer(text: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(strip_json_fences(text)).map_err(DecodeError::Outer)
}

pub fn decode_inner(outer: Value) -> Result<Value, DecodeError> {
    match outer {
        Value::Object(mut map) => match map.remove("body") {
            Some(Value::String(body)) => {
                serde_json::from_str(strip_json_fences(&body)).map_err(DecodeError::Inner)
            }
            Some(body) => Ok(body),
            None => Ok(Value::Object(map)),
        },
        other => Ok(other),
    }
}

pub fn take_field(payload: Value, field: &'static str) -> Result<Value, DecodeError> {
    match payload {
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Null) | None => Err(DecodeError::MissingField(field)),
            Some(value) => Ok(value),
        },
        _ => Err(DecodeError::MissingField(field)),
    }
}

/// Runs all stages and deserializes `field` into `T`.
pub fn decode_field<T: DeserializeOwned>(
    text: &str,
    field: &'static str,
) -> Result<T, DecodeError> {
    let outer = decode_outer(text)?;
    let payload = decode_inner(outer)?;
    let value = take_field(payload, field)?;
    serde_json::from_value(value).map_err(|source| DecodeError::Shape { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"} ";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_plain_envelope_with_object_body() {
        let text = r#"{"body": {"recommendations": {"careerPaths": []}}}"#;
        let payload = decode_inner(decode_outer(text).unwrap()).unwrap();
        let value = take_field(payload, "recommendations").unwrap();
        assert_eq!(value, json!({"careerPaths": []}));
    }

    #[test]
    fn test_double_encoded_fenced_body() {
        let inner =
            "```json\n{\"recommendations\": {\"careerPaths\": [{\"title\": \"Nurse\"}]}}\n```";
        let text = serde_json::to_string(&json!({ "statusCode": 200, "body": inner })).unwrap();
        let value: Value = decode_field(&text, "recommendations").unwrap();
        assert_eq!(value["careerPaths"][0]["title"], "Nurse");
    }

    #[test]
    fn test_fenced_outer_without_body() {
        let text = "```\n{\"recommendations\": {\"careerPaths\": []}}\n```";
        assert!(decode_field::<Value>(text, "recommendations").is_ok());
    }

    #[test]
    fn test_outer_failure_is_distinguished() {
        let err = decode_field::<Value>("<html>502</html>", "recommendations").unwrap_err();
        assert!(matches!(err, DecodeError::Outer(_)));
    }

    #[test]
    fn test_inner_failure_is_distinguished() {
        let text = r#"{"body": "{\"recommendations\": [oops"}"#;
        let err = decode_field::<Value>(text, "recommendations").unwrap_err();
        assert!(matches!(err, DecodeError::Inner(_)));
    }

    #[test]
    fn test_missing_field() {
        let text = r#"{"body": "{\"message\": \"rate limited\"}"}"#;
        let err = decode_field::<Value>(text, "recommendations").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("recommendations")));
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let err = decode_field::<Value>(r#"{"recommendations": null}"#, "recommendations")
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField(_)));
    }

    #[test]
    fn test_shape_mismatch() {
        let err = decode_field::<Vec<String>>(r#"{"recommendations": 5}"#, "recommendations")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Shape { .. }));
    }
}
