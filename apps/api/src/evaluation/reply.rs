//! Lenient field readers for model JSON replies.
//!
//! Models routinely send `null`, quoted numbers or mixed arrays. A field that
//! is null or of an unusable type reads as missing instead of failing the
//! whole reply.

use serde_json::Value;

/// Numeric field. Numeric strings such as `"85"` are accepted.
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// Array of strings. Non-string items are dropped; a non-array reads as missing.
pub fn string_list_field(value: &Value, key: &str) -> Option<Vec<String>> {
    value.get(key)?.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_field_accepts_numeric_strings() {
        let v = json!({"a": 85, "b": "85.5", "c": " 70 ", "d": "high", "e": null});
        assert_eq!(number_field(&v, "a"), Some(85.0));
        assert_eq!(number_field(&v, "b"), Some(85.5));
        assert_eq!(number_field(&v, "c"), Some(70.0));
        assert_eq!(number_field(&v, "d"), None);
        assert_eq!(number_field(&v, "e"), None);
        assert_eq!(number_field(&v, "missing"), None);
    }

    #[test]
    fn test_text_field_ignores_null_and_numbers() {
        let v = json!({"a": "ok", "b": null, "c": 3});
        assert_eq!(text_field(&v, "a").as_deref(), Some("ok"));
        assert_eq!(text_field(&v, "b"), None);
        assert_eq!(text_field(&v, "c"), None);
    }

    #[test]
    fn test_string_list_field_drops_non_strings() {
        let v = json!({"a": ["x", null, "y", 4], "b": "x", "c": null});
        assert_eq!(string_list_field(&v, "a"), Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(string_list_field(&v, "b"), None);
        assert_eq!(string_list_field(&v, "c"), None);
    }

    #[test]
    fn test_readers_on_non_object() {
        let v = json!([1, 2, 3]);
        assert_eq!(number_field(&v, "score"), None);
        assert_eq!(text_field(&v, "feedback"), None);
    }
}
