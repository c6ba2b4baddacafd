//! Transient record types flowing through the population pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::value::TypedValue;

/// One row of raw string values from a single source.
pub type RawRow = BTreeMap<String, String>;

/// Rows from every loaded source that share one join-key value.
///
/// Sources without a matching row are simply absent from `rows`.
#[derive(Debug, Clone, Default)]
pub struct JoinedRecord {
    pub key: String,
    pub rows: BTreeMap<String, RawRow>,
}

/// A record that passed validation, ready for submission.
///
/// Serializes to the flat field-name to value object the records API takes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    #[serde(skip)]
    pub key: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, TypedValue>,
}

/// Why an entire record was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A required field had no value after mapping and coercion.
    MissingRequired(String),
    /// A required field's value was rejected by its enum constraint.
    InvalidEnumRequired(String),
}

impl SkipReason {
    /// The field that triggered the skip.
    pub fn field(&self) -> &str {
        match self {
            SkipReason::MissingRequired(field) | SkipReason::InvalidEnumRequired(field) => field,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingRequired(field) => write!(f, "missing-required:{field}"),
            SkipReason::InvalidEnumRequired(field) => write!(f, "invalid-enum-required:{field}"),
        }
    }
}

/// A record rejected by the required-field gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub key: String,
    pub reason: SkipReason,
}

/// Result of one population run over a dataset.
#[derive(Debug, Clone, Default)]
pub struct PopulationOutcome {
    /// Kept records, in key-source row order.
    pub records: Vec<OutputRecord>,
    /// Records dropped by the required-field gate, with reasons.
    pub skipped: Vec<SkippedRecord>,
    /// Rows loaded per source, for reporting.
    pub source_counts: BTreeMap<String, usize>,
}

impl PopulationOutcome {
    pub fn kept_count(&self) -> usize {
        self.records.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
