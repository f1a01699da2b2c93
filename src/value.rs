use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be bound to a statement parameter slot.
///
/// This enum provides a unified representation of parameter values
/// across the supported database engines. Parameter bindings resolve a
/// log event into these; the backend modules convert them to the
/// driver's native parameter types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(0) => Some(false),
            SqlValue::Int(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// Map a loosely typed JSON property value onto the closest SQL value.
///
/// Strings become text, numbers collapse to integer where exact,
/// booleans stay booleans, and anything structured is carried through
/// as JSON so the driver can serialize it.
pub(crate) fn json_to_sql_value(value: &JsonValue) -> SqlValue {
    match value {
        JsonValue::Null => SqlValue::Null,
        JsonValue::Bool(b) => SqlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int(i)
            } else {
                SqlValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Json(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_return_matching_variant_only() {
        assert_eq!(SqlValue::Int(7).as_int(), Some(&7));
        assert_eq!(SqlValue::Text("x".into()).as_int(), None);
        assert_eq!(SqlValue::Text("x".into()).as_text(), Some("x"));
        assert_eq!(SqlValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SqlValue::Int(0).as_bool(), Some(false));
        assert!(SqlValue::Null.is_null());
    }

    #[test]
    fn json_property_mapping() {
        assert_eq!(json_to_sql_value(&json!("abc")), SqlValue::Text("abc".into()));
        assert_eq!(json_to_sql_value(&json!(42)), SqlValue::Int(42));
        assert_eq!(json_to_sql_value(&json!(1.5)), SqlValue::Float(1.5));
        assert_eq!(json_to_sql_value(&json!(null)), SqlValue::Null);
        assert_eq!(
            json_to_sql_value(&json!({"a": 1})),
            SqlValue::Json(json!({"a": 1}))
        );
    }
}
