//! Typed fact values stored in a [`WorldState`](crate::WorldState).
//!
//! Facts are dynamically typed: each key holds exactly one of a boolean, an
//! integer, a float or a string. Comparisons are tag-sensitive, so
//! `Value::Int(1)` never equals `Value::Float(1.0)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed fact.
///
/// # Examples
///
/// ```
/// use goap_engine::Value;
///
/// let happy = Value::from(true);
/// let age = Value::from(120);
///
/// assert_eq!(happy.as_bool(), Some(true));
/// assert_eq!(age.as_int(), Some(120));
/// assert_ne!(Value::from(1), Value::from(1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Returns the payload if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the payload if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the payload if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the payload if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Short tag naming the variant, used when encoding state keys.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    /// Unambiguous `tag:payload` encoding. Strings are quoted and escaped so
    /// separators inside them cannot forge another encoding.
    pub(crate) fn encode(&self) -> String {
        match self {
            Value::Bool(v) => format!("b:{}", v),
            Value::Int(v) => format!("i:{}", v),
            // -0.0 == 0.0, so both must share one key
            Value::Float(v) if *v == 0.0 => "f:0.0".to_string(),
            Value::Float(v) => format!("f:{:?}", v),
            Value::Str(v) => format!("s:{:?}", v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_tag() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(true).as_int(), None);
        assert_eq!(Value::from(7).as_int(), Some(7));
        assert_eq!(Value::from(0.5).as_float(), Some(0.5));
        assert_eq!(Value::from("dawn").as_str(), Some("dawn"));
        assert_eq!(Value::from("dawn").as_bool(), None);
    }

    #[test]
    fn test_equality_is_tag_sensitive() {
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(true), Value::from("true"));
        assert_eq!(Value::from(2.5f32), Value::from(2.5f64));
    }

    #[test]
    fn test_encoding_distinguishes_types() {
        let encoded: Vec<_> = [
            Value::from(1),
            Value::from(1.0),
            Value::from("1"),
            Value::from(true),
            Value::from("true"),
        ]
        .iter()
        .map(Value::encode)
        .collect();

        for (i, a) in encoded.iter().enumerate() {
            for b in encoded.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_signed_zeros_encode_alike() {
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
        assert_eq!(Value::Float(-0.0).encode(), Value::Float(0.0).encode());
        assert_ne!(Value::Float(0.0).encode(), Value::Int(0).encode());
    }

    #[test]
    fn test_string_encoding_escapes_separators() {
        assert_eq!(Value::from("a;b=c").encode(), "s:\"a;b=c\"");
        assert_ne!(Value::from("x\";").encode(), Value::from("x").encode());
    }

    #[test]
    fn test_json_round_trip_keeps_int_and_float_apart() {
        let values = vec![Value::from(3), Value::from(3.5), Value::from("idle")];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
