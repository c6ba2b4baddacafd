//! Type coercion: raw values into the schema-declared type.
//!
//! A value that cannot be represented in the declared type coerces to
//! `None`; the caller treats the field as absent. Whether that absence
//! skips the record is the validator's decision, not the coercer's.

use serde_json::Value;

use populate_model::{FieldSpec, FieldType, TypedValue};

use crate::map::RawValue;

const TRUTHY: [&str; 3] = ["true", "1", "yes"];
const FALSY: [&str; 3] = ["false", "0", "no"];

/// Convert a raw value into the field's declared type.
pub fn coerce(field: &FieldSpec, raw: &RawValue, array_delimiter: &str) -> Option<TypedValue> {
    match raw {
        RawValue::Text(text) => coerce_text(field.field_type, text, array_delimiter),
        RawValue::Literal(value) => coerce_literal(field.field_type, value, array_delimiter),
    }
}

fn coerce_text(field_type: FieldType, text: &str, delimiter: &str) -> Option<TypedValue> {
    if text.is_empty() {
        return None;
    }
    match field_type {
        FieldType::String => Some(TypedValue::String(text.to_string())),
        FieldType::Integer => parse_integer(text).map(TypedValue::Integer),
        FieldType::Number => parse_number(text).map(TypedValue::Number),
        FieldType::Boolean => parse_boolean(text).map(TypedValue::Boolean),
        FieldType::Array => {
            let elements: Vec<String> = text
                .split(delimiter)
                .map(str::trim)
                .filter(|element| !element.is_empty())
                .map(str::to_string)
                .collect();
            if elements.is_empty() {
                None
            } else {
                Some(TypedValue::Array(elements))
            }
        }
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    // Tolerate decimal notation for integer fields ("3.0" -> 3).
    parse_number(trimmed).map(|value| value.trunc() as i64)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_boolean(text: &str) -> Option<bool> {
    let lowered = text.trim().to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        return Some(true);
    }
    if FALSY.contains(&lowered.as_str()) {
        return Some(false);
    }
    None
}

/// Constants and schema defaults arrive as JSON literals and coerce
/// structurally; string literals follow the same rules as source text.
fn coerce_literal(field_type: FieldType, value: &Value, delimiter: &str) -> Option<TypedValue> {
    match value {
        Value::Null => None,
        Value::String(text) => coerce_text(field_type, text, delimiter),
        Value::Bool(flag) => match field_type {
            FieldType::Boolean => Some(TypedValue::Boolean(*flag)),
            FieldType::String => Some(TypedValue::String(flag.to_string())),
            _ => None,
        },
        Value::Number(number) => match field_type {
            FieldType::Integer => number
                .as_i64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|value| value.is_finite())
                        .map(|value| value.trunc() as i64)
                })
                .map(TypedValue::Integer),
            FieldType::Number => number.as_f64().map(TypedValue::Number),
            FieldType::String => Some(TypedValue::String(number.to_string())),
            _ => None,
        },
        Value::Array(items) => match field_type {
            FieldType::Array => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(text) => elements.push(text.clone()),
                        Value::Number(number) => elements.push(number.to_string()),
                        Value::Bool(flag) => elements.push(flag.to_string()),
                        _ => return None,
                    }
                }
                Some(TypedValue::Array(elements))
            }
            _ => None,
        },
        Value::Object(_) => None,
    }
}
