//! Source registry: load every declared source into a uniform row-set.
//!
//! Loads run concurrently, one scoped thread per source, and all of them
//! gate before the join stage. A failure in a source that backs no
//! required-field mapping (and is not the key source) is demoted to a
//! warning; any other failure aborts the run.

use std::collections::{BTreeMap, BTreeSet};
use std::thread;

use tracing::{debug, info, warn};

use populate_catalog::{CatalogClient, CatalogError, RowCache};
use populate_ingest::read_local_rows;
use populate_model::{MappingEntry, PopulationConfig, RawRow, Schema, SourceDef};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source '{name}': no file matches '{locator}'")]
    NotFound { name: String, locator: String },
    #[error("source '{name}' ({locator}): {message}")]
    Format {
        name: String,
        locator: String,
        message: String,
    },
    #[error("source '{name}': {source}")]
    Catalog {
        name: String,
        #[source]
        source: CatalogError,
    },
}

/// Row-sets loaded for one dataset, keyed by source name.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub rows: BTreeMap<String, Vec<RawRow>>,
}

impl LoadedSources {
    pub fn get(&self, name: &str) -> Option<&[RawRow]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.rows
            .iter()
            .map(|(name, rows)| (name.clone(), rows.len()))
            .collect()
    }
}

/// Names of sources that must load successfully: the key source plus every
/// source backing a required field's mapping.
pub fn required_sources(
    schema: &Schema,
    config: &PopulationConfig,
    key_source: &str,
) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    names.insert(key_source.to_string());
    for field in schema.required_fields() {
        if let Some(MappingEntry::Column { source, .. }) = config.mappings.get(&field.name) {
            names.insert(source.clone());
        }
    }
    names
}

/// Load every declared source, gating on all loads before returning.
pub fn load_sources(
    config: &PopulationConfig,
    dataset: &str,
    client: &dyn CatalogClient,
    cache: &dyn RowCache,
    required: &BTreeSet<String>,
) -> Result<LoadedSources, SourceError> {
    let mut results: Vec<(&String, Result<Vec<RawRow>, SourceError>)> = Vec::new();
    thread::scope(|scope| {
        let mut handles = Vec::new();
        for (name, def) in &config.sources {
            let handle = scope.spawn(move || load_one(name, def, dataset, client, cache));
            handles.push((name, handle));
        }
        for (name, handle) in handles {
            let result = handle.join().unwrap_or_else(|_| {
                Err(SourceError::Format {
                    name: name.clone(),
                    locator: config.sources[name].locator(),
                    message: "source loader panicked".to_string(),
                })
            });
            results.push((name, result));
        }
    });

    let mut loaded = LoadedSources::default();
    for (name, result) in results {
        match result {
            Ok(rows) => {
                info!(source = %name, rows = rows.len(), "source loaded");
                loaded.rows.insert(name.clone(), rows);
            }
            Err(error) if required.contains(name) => return Err(error),
            Err(error) => {
                warn!(source = %name, %error, "optional source skipped");
            }
        }
    }
    Ok(loaded)
}

fn load_one(
    name: &str,
    def: &SourceDef,
    dataset: &str,
    client: &dyn CatalogClient,
    cache: &dyn RowCache,
) -> Result<Vec<RawRow>, SourceError> {
    let locator = def.locator();
    let cache_key = match def {
        // Remote files are scoped to the dataset; local files are shared.
        SourceDef::Pennsieve { .. } => format!("{dataset}:{locator}"),
        SourceDef::Local { .. } => locator.clone(),
    };
    if let Some(rows) = cache.get(&cache_key) {
        debug!(source = name, key = %cache_key, "row cache hit");
        return Ok(rows);
    }

    let rows = match def {
        SourceDef::Pennsieve { file_pattern } => {
            let file = client
                .find_source_file(dataset, file_pattern)
                .map_err(|source| SourceError::Catalog {
                    name: name.to_string(),
                    source,
                })?
                .ok_or_else(|| SourceError::NotFound {
                    name: name.to_string(),
                    locator: locator.clone(),
                })?;
            populate_ingest::parse_source_content(&file.content, &file.name).map_err(|error| {
                SourceError::Format {
                    name: name.to_string(),
                    locator: locator.clone(),
                    message: error.to_string(),
                }
            })?
        }
        SourceDef::Local { path } => {
            if !path.exists() {
                return Err(SourceError::NotFound {
                    name: name.to_string(),
                    locator,
                });
            }
            read_local_rows(path).map_err(|error| SourceError::Format {
                name: name.to_string(),
                locator: locator.clone(),
                message: error.to_string(),
            })?
        }
    };
    cache.put(&cache_key, &rows);
    Ok(rows)
}
