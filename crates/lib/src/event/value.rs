//! Value types for wide-event fields.
//!
//! This module provides the [`Value`] enum representing everything that can
//! be stored at one slot of a wide event: scalar leaves (text, integers,
//! floats) or a nested [`Fields`] group forming one more level of the JSON
//! object.

use std::fmt;

use super::{EventError, Fields};

/// A single wide-event value: a scalar leaf or a nested field group.
///
/// The union is closed on purpose: serialization is an exhaustive match and
/// the accumulator logic (`add_int`/`add_float`) is checked at compile time
/// against every kind that can be stored.
///
/// Serialization is untagged, so the JSON form is exactly the scalar or
/// object it wraps.
///
/// # Direct Comparisons
///
/// `Value` implements `PartialEq` with primitive types for ergonomic
/// comparisons:
///
/// ```
/// use widelog::event::Value;
///
/// let text = Value::Text("hello".to_string());
/// let number = Value::Int(42);
///
/// assert!(text == "hello");
/// assert!(number == 42);
/// assert!(42 == number);
///
/// // Type mismatches return false
/// assert!(!(number == "hello"));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// UTF-8 text
    Text(String),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Nested group of fields, one more level of the output object
    Map(Fields),
}

impl Value {
    /// Returns true if this is a scalar leaf
    pub fn is_scalar(&self) -> bool {
        !self.is_map()
    }

    /// Returns true if this is a nested field group
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns the kind name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Map(_) => "map",
        }
    }

    /// Attempts to borrow the text content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Attempts to convert to an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to borrow the nested field group
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Attempts to mutably borrow the nested field group
    pub fn as_map_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Map(fields) => write!(f, "{fields}"),
        }
    }
}

// Convenient From implementations for common types

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Value::Map(value)
    }
}

// Typed extraction with structured errors, used by `Fields::get_as`

impl TryFrom<&Value> for i64 {
    type Error = EventError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_int().ok_or(EventError::TypeMismatch {
            expected: "int",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for f64 {
    type Error = EventError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_float().ok_or(EventError::TypeMismatch {
            expected: "float",
            actual: value.type_name(),
        })
    }
}

impl TryFrom<&Value> for String {
    type Error = EventError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value
            .as_text()
            .map(str::to_string)
            .ok_or(EventError::TypeMismatch {
                expected: "text",
                actual: value.type_name(),
            })
    }
}

impl<'a> TryFrom<&'a Value> for &'a str {
    type Error = EventError;

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        value.as_text().ok_or(EventError::TypeMismatch {
            expected: "text",
            actual: value.type_name(),
        })
    }
}

// Direct comparisons against primitives

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some(*other)
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        self.as_float() == Some(*other)
    }
}

impl PartialEq<Value> for f64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}
