use serde_json::Value;

use crate::services::bundle::UploadError;

/// Decodes the `permissions` form field.
///
/// Any well-formed JSON value is accepted; interpreting the structure is the
/// catalog's concern, not this layer's.
pub fn parse_permissions(text: &str) -> Result<Value, UploadError> {
    serde_json::from_str(text).map_err(UploadError::MalformedPermissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_decodes() {
        let value = parse_permissions(r#"{"view": ["anonymous"]}"#).unwrap();
        assert_eq!(value, json!({"view": ["anonymous"]}));
    }

    #[test]
    fn test_any_json_shape_is_accepted() {
        assert_eq!(parse_permissions("[]").unwrap(), json!([]));
        assert_eq!(parse_permissions("null").unwrap(), json!(null));
        assert_eq!(parse_permissions("42").unwrap(), json!(42));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = parse_permissions("{not json").unwrap_err();
        assert!(matches!(err, UploadError::MalformedPermissions(_)));
        assert!(err.to_string().contains("valid JSON"));
    }
}
