//! Directory-backed `CatalogClient`.
//!
//! Stand-in for the network client: datasets are directories on disk,
//! template schemas live as `<template_id>.json` files, and record
//! creation writes a JSON file under the dataset's output directory.
//! Used by the CLI and tests so the full pipeline runs without HTTP.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::{CatalogClient, CatalogError, ModelSpec, SourceFile};

/// Marker prefix for files soft-deleted in the catalog.
const DELETED_PREFIX: &str = "__DELETED__";

#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    templates_dir: PathBuf,
    output_dir: Option<PathBuf>,
}

impl DirectoryCatalog {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: None,
        }
    }

    /// Override the per-dataset `<dataset>/output` location for records.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Where `create_records` writes the payload for a model.
    pub fn records_path(&self, dataset: &str, model_id: &str) -> PathBuf {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => Path::new(dataset).join("output"),
        };
        dir.join(format!("{model_id}.records.json"))
    }
}

impl CatalogClient for DirectoryCatalog {
    fn template_schema(
        &self,
        _org_id: &str,
        template_id: &str,
    ) -> Result<serde_json::Value, CatalogError> {
        let path = self.templates_dir.join(format!("{template_id}.json"));
        if !path.exists() {
            return Err(CatalogError::TemplateNotFound {
                template_id: template_id.to_string(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogError::Json { path, source })
    }

    fn find_source_file(
        &self,
        dataset: &str,
        pattern: &str,
    ) -> Result<Option<SourceFile>, CatalogError> {
        let root = Path::new(dataset);
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        for path in files {
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with(DELETED_PREFIX) {
                continue;
            }
            if name == pattern || name.ends_with(pattern) {
                debug!(dataset, pattern, file = %path.display(), "matched source file");
                let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                return Ok(Some(SourceFile {
                    name: name.to_string(),
                    content,
                }));
            }
        }
        Ok(None)
    }

    fn create_model(
        &self,
        dataset: &str,
        template_id: &str,
        spec: &ModelSpec,
    ) -> Result<String, CatalogError> {
        debug!(dataset, template_id, model = %spec.name, "create model");
        Ok(spec.name.clone())
    }

    fn create_records(
        &self,
        dataset: &str,
        model_id: &str,
        records: &[serde_json::Value],
    ) -> Result<(), CatalogError> {
        let path = self.records_path(dataset, model_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::json!({ "records": records });
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|error| CatalogError::Message(error.to_string()))?;
        fs::write(&path, text).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(dataset, model_id, count = records.len(), path = %path.display(), "records written");
        Ok(())
    }
}

/// Recursively list files under `dir` in sorted order, skipping anything
/// inside an `archive` folder and the output directory itself.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            let skip = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.eq_ignore_ascii_case("archive") || name == "output");
            if !skip {
                collect_files(&path, files)?;
            }
        } else {
            files.push(path);
        }
    }
    Ok(())
}
