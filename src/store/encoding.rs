//! The reversible text encoding applied to every stored record.
//!
//! A value is serialized to compact JSON and the UTF-8 bytes are written as
//! standard base64. This is obfuscation only: anyone with access to the medium
//! can read every record back. It is NOT encryption and must not be relied on
//! to protect secrets such as the GitHub token.

use crate::errors::StorageError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Encodes a value into its stored text form.
///
/// # Examples
///
/// ```
/// use codemood::store::encoding::{decode, encode};
/// use serde_json::json;
///
/// let value = json!({"mood": "🚀", "tags": ["bug"]});
/// let stored = encode("example", &value).unwrap();
/// assert_eq!(decode("example", &stored).unwrap(), value);
/// ```
pub fn encode(key: &str, value: &Value) -> Result<String, StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    Ok(STANDARD.encode(json))
}

/// Decodes stored text back into a value.
///
/// # Errors
///
/// Returns `StorageError::Decode` when the text is not valid base64, the bytes
/// are not UTF-8, or the payload is not JSON.
pub fn decode(key: &str, stored: &str) -> Result<Value, StorageError> {
    let decode_error = |message: String| StorageError::Decode {
        key: key.to_string(),
        message,
    };

    let bytes = STANDARD
        .decode(stored.trim())
        .map_err(|e| decode_error(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| decode_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_form_is_standard_base64_of_compact_json() {
        assert_eq!(encode("k", &json!("foo")).unwrap(), "ImZvbyI=");
        assert_eq!(encode("k", &json!([1])).unwrap(), "WzFd");
        assert_eq!(decode("k", "eyJhIjp0cnVlfQ==").unwrap(), json!({"a": true}));
        assert_eq!(decode("k", "  WzFd\n").unwrap(), json!([1]));
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let values = [
            json!(null),
            json!(true),
            json!(3),
            json!("plain"),
            json!("émoji ☕️ 🤯 and \"quotes\""),
            json!([]),
            json!({}),
            json!([{"id": "1", "tags": ["a", "b"], "nested": {"deep": [1, 2.5, null]}}]),
        ];
        for value in values {
            let stored = encode("k", &value).unwrap();
            assert_eq!(decode("k", &stored).unwrap(), value);
        }
    }

    #[test]
    fn test_stored_text_is_not_plain_json() {
        let stored = encode("k", &json!({"token": "secret"})).unwrap();
        assert!(!stored.contains("secret"));
        assert!(stored
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='));
    }

    #[test]
    fn test_decode_rejects_corruption() {
        assert!(decode("k", "not base64!").is_err());
        assert!(decode("k", "Zm9").is_err());
        assert!(decode("k", "=Zm9").is_err());
        // valid base64, but "foo" is not JSON
        assert!(decode("k", "Zm9v").is_err());
        // valid base64 of invalid UTF-8
        assert!(decode("k", "/w==").is_err());

        match decode("journalEntries", "@@@@") {
            Err(StorageError::Decode { key, .. }) => assert_eq!(key, "journalEntries"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }
}
