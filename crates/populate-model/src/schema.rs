//! Resolved schema types: the typed field catalog derived from a template's
//! JSON-Schema document.

use serde::{Deserialize, Serialize};

/// Value types a template schema may declare for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
        }
    }
}

/// One resolved schema property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Property name, used as the record field name.
    pub name: String,
    /// Declared type the coercer targets.
    pub field_type: FieldType,
    /// Enum constraint copied verbatim from the schema, if any.
    pub allowed: Option<Vec<String>>,
    /// True when the schema's required list names this property.
    pub required: bool,
    /// True for the single property carrying the key extension marker.
    pub is_key: bool,
    /// Human-readable description from the schema.
    pub description: Option<String>,
    /// Schema-supplied default applied to unmapped fields.
    pub default: Option<serde_json::Value>,
}

impl FieldSpec {
    /// True when the enum constraint explicitly lists the literal.
    pub fn allows(&self, literal: &str) -> bool {
        self.allowed
            .as_ref()
            .is_some_and(|values| values.iter().any(|value| value == literal))
    }
}

/// Field catalog resolved from a template schema.
///
/// Resolution guarantees at most one key-marked field and fails when none
/// is marked, so a resolved schema always answers `key_field()` with `Some`.
#[derive(Debug, Clone)]
pub struct Schema {
    pub title: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// The key-marked field, if present.
    pub fn key_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.is_key)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields the schema marks as required.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }
}
