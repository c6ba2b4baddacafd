//! Field-level validation: null-marker handling and enum membership.
//!
//! Two-tier policy: a bad value on an optional field drops only that
//! field; the record-level required gate lives in the pipeline.

use populate_model::{FieldSpec, TypedValue};

/// Null marker dropped unless the field's enum explicitly allows it.
pub const NULL_MARKER: &str = "n/a";

/// Decision for one coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Keep(TypedValue),
    Drop(DropCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropCause {
    /// Value was the null marker and no enum allows it.
    NullMarker,
    /// Value is not a member of the field's enum constraint.
    EnumRejected,
}

/// Apply the null-marker and enum rules to one coerced value.
///
/// Enum matching is lenient on case: a case-insensitive hit keeps the
/// value, canonicalized to the enum literal's spelling.
pub fn check_field(field: &FieldSpec, value: TypedValue) -> FieldOutcome {
    let Some(allowed) = &field.allowed else {
        if matches!(&value, TypedValue::String(text) if text == NULL_MARKER) {
            return FieldOutcome::Drop(DropCause::NullMarker);
        }
        return FieldOutcome::Keep(value);
    };

    let text = value_text(&value);
    if allowed.iter().any(|literal| literal == &text) {
        return FieldOutcome::Keep(value);
    }
    if let Some(canonical) = allowed
        .iter()
        .find(|literal| literal.eq_ignore_ascii_case(&text))
    {
        return FieldOutcome::Keep(TypedValue::String(canonical.clone()));
    }
    FieldOutcome::Drop(DropCause::EnumRejected)
}

fn value_text(value: &TypedValue) -> String {
    match value {
        TypedValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}
