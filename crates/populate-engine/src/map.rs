//! Field mapping: declarative rules into raw per-record values.

use serde_json::Value;

use populate_model::{FieldSpec, JoinedRecord, MappingEntry};

/// Raw value produced by the mapper, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// String cell taken from a source column.
    Text(String),
    /// JSON literal from a constant mapping or a schema default.
    Literal(Value),
}

/// Produce the raw value for one field of one joined record.
///
/// A column projection fails softly: a missing source row, missing column
/// or empty cell yields `None`. Fields without a mapping fall back to the
/// schema default, when one exists.
pub fn map_field(
    field: &FieldSpec,
    entry: Option<&MappingEntry>,
    record: &JoinedRecord,
) -> Option<RawValue> {
    match entry {
        Some(MappingEntry::Column { source, column }) => {
            let value = record.rows.get(source)?.get(column)?;
            if value.is_empty() {
                None
            } else {
                Some(RawValue::Text(value.clone()))
            }
        }
        Some(MappingEntry::Constant { value }) => Some(RawValue::Literal(value.clone())),
        None => field.default.clone().map(RawValue::Literal),
    }
}
