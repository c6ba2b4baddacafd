//! Tagged value representation for populated record fields.
//!
//! Template schemas are discovered at runtime, so records cannot have a
//! fixed shape; every field value is one of a closed set of typed variants.

use std::fmt;

use serde::Serialize;

/// Typed value for one populated field.
///
/// Serializes untagged, producing the plain JSON literal the records API
/// expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Array(Vec<String>),
}

impl TypedValue {
    /// Borrow the string content, for string-typed values only.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(value) => write!(f, "{value}"),
            TypedValue::Number(value) => write!(f, "{value}"),
            TypedValue::Integer(value) => write!(f, "{value}"),
            TypedValue::Boolean(value) => write!(f, "{value}"),
            TypedValue::Array(values) => write!(f, "{}", values.join(", ")),
        }
    }
}
