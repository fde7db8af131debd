//! Untyped request fields as a tagged value type.
//!
//! Requests arrive as a loosely-typed mapping (JSON objects, form bodies,
//! query strings). [`Fields`] keeps that mapping, but every value is a
//! [`FieldValue`] so the coercions applied later by the validator are
//! explicit. A field that was not sent is simply not in the map.

use std::collections::BTreeMap;
use std::fmt;

use super::ValidationError;

/// A single wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A JSON integer.
    Integer(i64),
    /// A JSON number with a fractional part or outside the `i64` range.
    Float(f64),
    /// A JSON string, or any form / query parameter.
    Text(String),
}

impl FieldValue {
    /// Converts a JSON value, rejecting kinds the API never accepts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedValue`] for `null`, booleans,
    /// arrays and objects.
    pub fn from_json(field: &str, value: serde_json::Value) -> Result<Self, ValidationError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| unsupported(field)),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            _ => Err(unsupported(field)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn unsupported(field: &str) -> ValidationError {
    ValidationError::UnsupportedValue {
        field: field.to_string(),
    }
}

/// Field name to value mapping decoded from a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    /// Builds fields from a decoded JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedValue`] naming the first field
    /// whose value kind is not accepted.
    pub fn from_json(object: serde_json::Map<String, serde_json::Value>) -> Result<Self, ValidationError> {
        object
            .into_iter()
            .map(|(name, value)| {
                let value = FieldValue::from_json(&name, value)?;
                Ok((name, value))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }

    /// Builds fields from string pairs (form bodies and query strings).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), FieldValue::Text(v.into())))
                .collect(),
        )
    }

    /// Returns the value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Returns `true` if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        let serde_json::Value::Object(map) = value else {
            panic!("expected object");
        };
        map
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        let Ok(fields) = Fields::from_json(object(json!({"user_id": 3, "event_id": 7.9}))) else {
            panic!("valid fields");
        };
        assert_eq!(fields.get("user_id"), Some(&FieldValue::Integer(3)));
        assert_eq!(fields.get("event_id"), Some(&FieldValue::Float(7.9)));
    }

    #[test]
    fn null_and_bool_are_rejected() {
        let err = Fields::from_json(object(json!({"user_id": null})));
        assert!(matches!(
            err,
            Err(ValidationError::UnsupportedValue { ref field }) if field == "user_id"
        ));

        let err = Fields::from_json(object(json!({"content": true})));
        assert!(matches!(err, Err(ValidationError::UnsupportedValue { .. })));
    }

    #[test]
    fn pairs_become_text() {
        let fields = Fields::from_pairs([("user_id", "7")]);
        assert_eq!(fields.get("user_id"), Some(&FieldValue::Text("7".to_string())));
        assert!(!fields.contains("date"));
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(FieldValue::Integer(42).to_string(), "42");
        assert_eq!(FieldValue::Float(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Text("hi".to_string()).to_string(), "hi");
    }
}
