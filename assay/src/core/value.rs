//! Cell values held by a [`Batch`](super::Batch).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of tabular data.
///
/// Values serialize as plain JSON scalars so that persisted suites and rendered
/// reports read naturally (`null`, `true`, `3`, `2.5`, `"N"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A missing value
    Null,
    /// A boolean
    Bool(bool),
    /// A signed integer
    Int(i64),
    /// A floating point number
    Float(f64),
    /// A string
    Text(String),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric value for integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string slice for text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values for set membership and uniqueness.
    ///
    /// Integers and floats compare numerically, so `Int(3)` matches `Float(3.0)`.
    /// Two integers always compare exactly.
    pub fn loosely_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                float_as_int(*f) == Some(*i)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => self == other,
        }
    }

    /// Returns a hashable key that is consistent with [`Value::loosely_eq`].
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Value::Null => "n:".to_string(),
            Value::Bool(b) => format!("b:{b}"),
            Value::Int(v) => format!("i:{v}"),
            Value::Float(f) => match float_as_int(*f) {
                Some(v) => format!("i:{v}"),
                None => format!("f:{}", f.to_bits()),
            },
            Value::Text(s) => format!("t:{s}"),
        }
    }
}

/// Returns the integer a float is exactly equal to, if any.
fn float_as_int(f: f64) -> Option<i64> {
    // i64::MIN is exactly representable; i64::MAX rounds up to 2^63
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (LOWER..UPPER).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
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
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
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

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
