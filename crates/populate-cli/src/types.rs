use std::path::PathBuf;

use populate_model::PopulationOutcome;

#[derive(Debug)]
pub struct PopulateResult {
    pub model_name: String,
    pub summaries: Vec<DatasetSummary>,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

impl PopulateResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct DatasetSummary {
    pub dataset: String,
    pub outcome: PopulationOutcome,
    pub output: Option<PathBuf>,
}
