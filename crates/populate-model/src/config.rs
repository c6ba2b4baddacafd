//! Population configuration: sources, join key, and field mappings.
//!
//! The configuration document is immutable once deserialized; every
//! invariant it must satisfy against the schema is checked by the engine's
//! preflight pass before any source is loaded.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Delimiter used for array-typed fields when the config does not set one.
pub const DEFAULT_ARRAY_DELIMITER: &str = ";";

/// A named provider of raw tabular rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceDef {
    /// Tabular file inside the target dataset, matched by name pattern.
    Pennsieve { file_pattern: String },
    /// File on the local filesystem.
    Local { path: PathBuf },
}

impl SourceDef {
    /// Human-readable locator, also used as part of the row-cache key.
    pub fn locator(&self) -> String {
        match self {
            SourceDef::Pennsieve { file_pattern } => file_pattern.clone(),
            SourceDef::Local { path } => path.display().to_string(),
        }
    }
}

/// Declarative rule producing one field's raw value.
///
/// A closed variant matched exhaustively; either a source-column projection
/// or a constant literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    /// Project a column from a named source's row.
    Column { source: String, column: String },
    /// A fixed JSON literal applied to every record.
    Constant { value: serde_json::Value },
}

/// Top-level configuration document for one population run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub org_id: String,
    pub template_id: String,
    pub model_name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sources: BTreeMap<String, SourceDef>,
    /// Column name used to correlate rows across sources.
    pub join_key: String,
    /// Source whose rows define the record universe. Derived from the key
    /// field's column mapping when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_source: Option<String>,
    /// Delimiter splitting raw values for array-typed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_delimiter: Option<String>,
    pub mappings: BTreeMap<String, MappingEntry>,
}

impl PopulationConfig {
    /// Parse a configuration document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The effective array delimiter.
    pub fn delimiter(&self) -> &str {
        self.array_delimiter
            .as_deref()
            .unwrap_or(DEFAULT_ARRAY_DELIMITER)
    }
}
