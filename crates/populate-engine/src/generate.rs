//! Starter configuration generation from a resolved schema.
//!
//! Inverse-direction helper: given the field catalog, emit a mapping
//! skeleton for a human to finish. Fields with a schema default become
//! constants; others become column projections against a source inferred
//! from the field description, falling back to a placeholder source.

use std::collections::BTreeMap;

use populate_model::{FieldSpec, MappingEntry, PopulationConfig, Schema, SourceDef};

/// Placeholder source name for fields whose origin cannot be inferred.
pub const TODO_SOURCE: &str = "TODO";

/// Derive a starter mapping configuration from a resolved schema.
pub fn generate_config(schema: &Schema, org_id: &str, template_id: &str) -> PopulationConfig {
    let mut mappings = BTreeMap::new();
    let mut sources: BTreeMap<String, SourceDef> = BTreeMap::new();
    for field in &schema.fields {
        let entry = if let Some(default) = &field.default {
            MappingEntry::Constant {
                value: default.clone(),
            }
        } else if let Some((source, pattern)) = infer_source(field) {
            sources
                .entry(source.clone())
                .or_insert(SourceDef::Pennsieve {
                    file_pattern: pattern,
                });
            MappingEntry::Column {
                source,
                column: field.name.clone(),
            }
        } else {
            MappingEntry::Column {
                source: TODO_SOURCE.to_string(),
                column: field.name.clone(),
            }
        };
        mappings.insert(field.name.clone(), entry);
    }

    let join_key = schema
        .key_field()
        .map(|field| field.name.clone())
        .unwrap_or_default();
    let model_name = schema.title.clone().unwrap_or_else(|| "model".to_string());
    PopulationConfig {
        org_id: org_id.to_string(),
        template_id: template_id.to_string(),
        display_name: display_name_for(&model_name),
        model_name,
        description: None,
        sources,
        join_key,
        key_source: None,
        array_delimiter: None,
        mappings,
    }
}

/// Infer a source from a `<name>.tsv` / `<name>.csv` / `<name>.json`
/// mention in the field description.
fn infer_source(field: &FieldSpec) -> Option<(String, String)> {
    let description = field.description.as_deref()?.to_lowercase();
    for extension in [".tsv", ".csv", ".json"] {
        let Some(end) = description.find(extension) else {
            continue;
        };
        let stem_start = description[..end]
            .rfind(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'))
            .map_or(0, |idx| idx + 1);
        let stem = &description[stem_start..end];
        let name = stem.trim_start_matches(['_', '-']);
        if name.is_empty() {
            continue;
        }
        return Some((name.to_string(), format!("{stem}{extension}")));
    }
    None
}

fn display_name_for(model_name: &str) -> String {
    model_name
        .split(['_', ' '])
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
