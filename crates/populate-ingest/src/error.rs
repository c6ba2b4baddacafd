use std::path::PathBuf;

/// Content could not be parsed into rows.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

/// Failure loading rows from a local file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
}
