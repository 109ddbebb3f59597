//! Error types shared by the data and aggregation layers.

use std::path::PathBuf;

use thiserror::Error;


/// Failures surfaced by loading, filtering, aggregating and exporting.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("column '{column}' is not part of the loaded schema")]
    SchemaMismatch { column: String },

    #[error("failed to load {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("export failed: {0}")]
    Export(String),
}


impl DashboardError {
    pub fn schema_mismatch(column: impl Into<String>) -> Self {
        Self::SchemaMismatch { column: column.into() }
    }

    pub fn load_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
