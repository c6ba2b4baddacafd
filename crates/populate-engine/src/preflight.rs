//! Configuration preflight: every structural invariant is checked here,
//! before any source is touched.

use tracing::warn;

use populate_model::{MappingEntry, PopulationConfig, Schema};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("schema has no key field")]
    MissingKeyField,
    #[error("key field '{field}' has no mapping entry")]
    UnmappedKeyField { field: String },
    #[error("required field '{field}' has no mapping entry")]
    UnmappedRequired { field: String },
    #[error("mapping for '{field}' references undeclared source '{source}'")]
    UnknownSource { field: String, r#source: String },
    #[error("key field '{field}' must map to a source column, not a constant")]
    ConstantKeyMapping { field: String },
    #[error("key_source '{source}' is not a declared source")]
    UnknownKeySource { r#source: String },
    #[error("key_source '{configured}' disagrees with the key field's mapping source '{mapped}'")]
    KeySourceMismatch { configured: String, mapped: String },
}

/// Validate the config against the resolved schema.
///
/// Returns the name of the source that defines the record universe: the
/// explicit `key_source` when configured, otherwise the source named by
/// the key field's column mapping.
pub fn preflight(schema: &Schema, config: &PopulationConfig) -> Result<String, ConfigError> {
    let key_field = schema.key_field().ok_or(ConfigError::MissingKeyField)?;

    let key_mapping =
        config
            .mappings
            .get(&key_field.name)
            .ok_or_else(|| ConfigError::UnmappedKeyField {
                field: key_field.name.clone(),
            })?;
    let mapped_key_source = match key_mapping {
        MappingEntry::Column { source, .. } => source.clone(),
        MappingEntry::Constant { .. } => {
            return Err(ConfigError::ConstantKeyMapping {
                field: key_field.name.clone(),
            });
        }
    };

    let key_source = match &config.key_source {
        Some(configured) if configured != &mapped_key_source => {
            return Err(ConfigError::KeySourceMismatch {
                configured: configured.clone(),
                mapped: mapped_key_source,
            });
        }
        Some(configured) => configured.clone(),
        None => mapped_key_source,
    };
    if !config.sources.contains_key(&key_source) {
        return Err(ConfigError::UnknownKeySource { source: key_source });
    }

    for (field_name, entry) in &config.mappings {
        if schema.field(field_name).is_none() {
            warn!(field = %field_name, "mapping for a field not in the schema, ignoring");
            continue;
        }
        if let MappingEntry::Column { source, .. } = entry
            && !config.sources.contains_key(source)
        {
            return Err(ConfigError::UnknownSource {
                field: field_name.clone(),
                source: source.clone(),
            });
        }
    }

    for field in schema.required_fields() {
        // A schema default satisfies a required field without a mapping.
        if config.mappings.contains_key(&field.name) || field.default.is_some() {
            continue;
        }
        return Err(ConfigError::UnmappedRequired {
            field: field.name.clone(),
        });
    }

    Ok(key_source)
}
