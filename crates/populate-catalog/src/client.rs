//! Boundary to the remote catalog service.
//!
//! Network transport, authentication, retries and timeouts live behind
//! this trait; the engine never talks to the API directly.

use std::path::PathBuf;

use serde::Serialize;

/// Request payload for creating a model from a template.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A source file located inside a dataset.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("template not found: {template_id}")]
    TemplateNotFound { template_id: String },
    #[error("{0}")]
    Message(String),
}

/// Operations the engine needs from the catalog service.
pub trait CatalogClient: Send + Sync {
    /// Fetch the JSON-Schema document for a metadata template.
    fn template_schema(
        &self,
        org_id: &str,
        template_id: &str,
    ) -> Result<serde_json::Value, CatalogError>;

    /// Find a tabular file in the dataset matching the pattern, if any.
    fn find_source_file(
        &self,
        dataset: &str,
        pattern: &str,
    ) -> Result<Option<SourceFile>, CatalogError>;

    /// Create (or reuse) a model from the template, returning its id.
    fn create_model(
        &self,
        dataset: &str,
        template_id: &str,
        spec: &ModelSpec,
    ) -> Result<String, CatalogError>;

    /// Submit records to a model.
    fn create_records(
        &self,
        dataset: &str,
        model_id: &str,
        records: &[serde_json::Value],
    ) -> Result<(), CatalogError>;
}
