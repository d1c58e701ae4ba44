//! Dynamic value representation for engine traffic
//!
//! Every property, option, and event payload crossing the media-engine
//! boundary is expressed as a `Value`. The enum is closed on purpose:
//! encoding to the engine's native format matches each variant explicitly,
//! while decoding maps anything the engine introduces later to `Absent`.

use serde::{Deserialize, Serialize};

/// Dynamic tagged-union value exchanged with the media engine
///
/// Mappings preserve insertion order and are expected to carry unique
/// text keys; the marshaler treats them as an ordered association list
/// rather than a hash map so round trips are byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value (unavailable property, unknown engine tag)
    Absent,

    /// Boolean flag
    Bool(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// Double-precision float
    Double(f64),

    /// UTF-8 text
    Text(String),

    /// Ordered list of values
    Sequence(Vec<Value>),

    /// Ordered list of (key, value) pairs with unique keys
    Mapping(Vec<(String, Value)>),
}

impl Value {
    /// Whether this value is `Absent`
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Boolean payload, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload; `Double` values with no fractional part coerce
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Double(d) if d.fract() == 0.0 => Some(*d as i64),
            _ => None,
        }
    }

    /// Float payload; `Integer` values coerce
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text payload, if this is `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Loose truthiness, matching how the engine reports flag-like
    /// properties (`eof-reached` may arrive as a flag, integer, or float)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Sequence(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_variant_tags() {
        let value = Value::Mapping(vec![
            ("volume".to_owned(), Value::Integer(80)),
            ("title".to_owned(), Value::Text("news".to_owned())),
        ]);
        let json = serde_json::to_string(&value).expect("serializable");
        let back: Value = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, value);
    }

    #[test]
    fn truthiness_covers_flag_like_encodings() {
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Integer(1).is_truthy());
        assert!(Value::Double(1.0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Double(0.0).is_truthy());
        assert!(!Value::Absent.is_truthy());
        assert!(!Value::Text("true".into()).is_truthy());
    }

    #[test]
    fn numeric_coercion_is_lossless_only() {
        assert_eq!(Value::Double(3.0).as_i64(), Some(3));
        assert_eq!(Value::Double(3.5).as_i64(), None);
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("3".into()).as_i64(), None);
    }
}
