//! Schema resolution: raw JSON-Schema document into a typed field catalog.

use serde_json::Value;

use populate_model::{FieldSpec, FieldType, Schema};

/// Extension marker identifying the record key property.
pub const KEY_MARKER: &str = "x-pennsieve-key";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema document has no 'properties' object")]
    MissingProperties,
    #[error("no property carries the x-pennsieve-key marker")]
    NoKeyField,
    #[error("multiple properties carry the x-pennsieve-key marker: {fields}")]
    MultipleKeyFields { fields: String },
    #[error("invalid property '{name}': {message}")]
    InvalidProperty { name: String, message: String },
}

/// Flatten a template schema's top-level properties into a `Schema`.
///
/// Required flags come from the document's `required` list, enum
/// constraints are copied verbatim, and exactly one property must carry
/// the key marker.
pub fn resolve_schema(document: &Value) -> Result<Schema, SchemaError> {
    let properties = document
        .get("properties")
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingProperties)?;
    let required: Vec<&str> = document
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::with_capacity(properties.len());
    let mut key_fields: Vec<String> = Vec::new();
    for (name, definition) in properties {
        let field_type = resolve_type(name, definition)?;
        let allowed = definition
            .get("enum")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(enum_literal).collect());
        let is_key = definition
            .get(KEY_MARKER)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if is_key {
            key_fields.push(name.clone());
        }
        fields.push(FieldSpec {
            name: name.clone(),
            field_type,
            allowed,
            required: required.iter().any(|entry| entry == name),
            is_key,
            description: definition
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            default: definition.get("default").cloned(),
        });
    }

    match key_fields.len() {
        0 => Err(SchemaError::NoKeyField),
        1 => Ok(Schema {
            title: document
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            fields,
        }),
        _ => Err(SchemaError::MultipleKeyFields {
            fields: key_fields.join(", "),
        }),
    }
}

fn resolve_type(name: &str, definition: &Value) -> Result<FieldType, SchemaError> {
    match definition.get("type").and_then(Value::as_str) {
        // Untyped properties pass values through as strings.
        None => Ok(FieldType::String),
        Some("string") => Ok(FieldType::String),
        Some("number") => Ok(FieldType::Number),
        Some("integer") => Ok(FieldType::Integer),
        Some("boolean") => Ok(FieldType::Boolean),
        Some("array") => Ok(FieldType::Array),
        Some(other) => Err(SchemaError::InvalidProperty {
            name: name.to_string(),
            message: format!("unsupported type '{other}'"),
        }),
    }
}

fn enum_literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
