//! Lenient decoding for identifier fields
//!
//! The backend stores identifiers in SQLite and returns them as whatever type
//! the column happened to hold, so `"P-102"`, `102` and `null` all occur.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar JSON value as text; `null` and empty strings become `None`
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `deserialize_with` helper for optional identifier fields
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_text))
}

/// `deserialize_with` helper for required identifier fields
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_text(&value).ok_or_else(|| serde::de::Error::custom("expected a non-empty identifier"))
}

/// `deserialize_with` helper for numeric columns that may arrive as text
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("P-1")), Some("P-1".to_string()));
        assert_eq!(value_to_text(&json!(42)), Some("42".to_string()));
        assert_eq!(value_to_text(&json!("")), None);
        assert_eq!(value_to_text(&json!(null)), None);
    }
}
