//! Population pipeline with explicit stages.
//!
//! 1. **Resolve**: template schema document into a typed field catalog
//! 2. **Preflight**: config invariants, before any source is touched
//! 3. **Load**: all declared sources, concurrently, gated together
//! 4. **Assemble**: join, map, coerce and validate per record
//!
//! The assembly core is pure; dry-run only suppresses the submission side
//! effect in the caller, never any pipeline stage.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use populate_catalog::{CatalogClient, CatalogError, RowCache};
use populate_model::{
    OutputRecord, PopulationConfig, PopulationOutcome, Schema, SkipReason, SkippedRecord,
};

use crate::coerce::coerce;
use crate::join::join_records;
use crate::map::map_field;
use crate::preflight::{ConfigError, preflight};
use crate::schema::{SchemaError, resolve_schema};
use crate::sources::{LoadedSources, SourceError, load_sources, required_sources};
use crate::validate::{DropCause, FieldOutcome, check_field};

#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Assemble one output record, or decide to skip it.
pub fn assemble_record(
    schema: &Schema,
    config: &PopulationConfig,
    record: &populate_model::JoinedRecord,
) -> Result<OutputRecord, SkipReason> {
    let delimiter = config.delimiter();
    let mut fields = BTreeMap::new();
    for field in &schema.fields {
        let entry = config.mappings.get(&field.name);
        let coerced = map_field(field, entry, record)
            .and_then(|raw| match coerce(field, &raw, delimiter) {
                Some(value) => Some(value),
                None => {
                    debug!(
                        key = %record.key,
                        field = %field.name,
                        declared = field.field_type.as_str(),
                        "value failed coercion, treating as absent"
                    );
                    None
                }
            });
        match coerced.map(|value| check_field(field, value)) {
            Some(FieldOutcome::Keep(value)) => {
                fields.insert(field.name.clone(), value);
            }
            Some(FieldOutcome::Drop(cause)) => {
                if field.required {
                    return Err(match cause {
                        DropCause::EnumRejected => {
                            SkipReason::InvalidEnumRequired(field.name.clone())
                        }
                        DropCause::NullMarker => SkipReason::MissingRequired(field.name.clone()),
                    });
                }
                debug!(key = %record.key, field = %field.name, ?cause, "field value dropped");
            }
            None => {
                if field.required {
                    return Err(SkipReason::MissingRequired(field.name.clone()));
                }
            }
        }
    }
    Ok(OutputRecord {
        key: record.key.clone(),
        fields,
    })
}

/// Pure assembly core: join loaded rows and build output records.
///
/// Record order follows the key source's row order; running twice on the
/// same inputs yields an identical sequence.
pub fn assemble_records(
    schema: &Schema,
    config: &PopulationConfig,
    key_source: &str,
    sources: &LoadedSources,
) -> PopulationOutcome {
    let joined = join_records(sources, key_source, &config.join_key);
    let mut outcome = PopulationOutcome {
        source_counts: sources.counts(),
        ..PopulationOutcome::default()
    };
    for record in &joined {
        match assemble_record(schema, config, record) {
            Ok(output) => outcome.records.push(output),
            Err(reason) => {
                warn!(key = %record.key, reason = %reason, "record skipped");
                outcome.skipped.push(SkippedRecord {
                    key: record.key.clone(),
                    reason,
                });
            }
        }
    }
    outcome
}

/// Run the full pipeline for one dataset.
pub fn run_population(
    config: &PopulationConfig,
    dataset: &str,
    client: &dyn CatalogClient,
    cache: &dyn RowCache,
) -> Result<PopulationOutcome, PopulateError> {
    let span = info_span!("populate", dataset = %dataset, model = %config.model_name);
    let _guard = span.enter();

    let document = client.template_schema(&config.org_id, &config.template_id)?;
    let schema = resolve_schema(&document)?;
    let key_source = preflight(&schema, config)?;
    info!(
        fields = schema.fields.len(),
        key_source = %key_source,
        "schema resolved"
    );

    let required = required_sources(&schema, config, &key_source);
    let load_start = Instant::now();
    let sources = load_sources(config, dataset, client, cache, &required)?;
    info!(
        sources = sources.rows.len(),
        duration_ms = load_start.elapsed().as_millis(),
        "sources loaded"
    );

    let assemble_start = Instant::now();
    let outcome = assemble_records(&schema, config, &key_source, &sources);
    info!(
        kept = outcome.kept_count(),
        skipped = outcome.skipped_count(),
        duration_ms = assemble_start.elapsed().as_millis(),
        "records assembled"
    );
    Ok(outcome)
}
