use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure taxonomy for the pipeline stages.
///
/// Every stage failure carries enough context (file path, stage name,
/// underlying cause) to diagnose without rerunning.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input file is absent or unreadable.
    #[error("cannot read {path}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A hard-required column is absent after heuristic + fallback.
    #[error("required column '{column}' not found in {path}")]
    InvalidSchema { column: String, path: PathBuf },

    /// The requested phenotype column does not exist in the joined data.
    #[error("phenotype column '{column}' not present in {path}")]
    InvalidPhenotype { column: String, path: PathBuf },

    /// Cohorts with incompatible marker spaces failed to merge.
    #[error("cohort merge conflict against reference {reference}: {detail}")]
    MergeConflict { reference: PathBuf, detail: String },

    /// An external engine process failed (non-zero exit, timeout, or spawn error).
    #[error("{stage}: engine '{program}' failed: {detail}")]
    EngineExecution {
        stage: &'static str,
        program: String,
        detail: String,
    },

    /// Dataset re-encoding failed on malformed source content.
    #[error("format conversion failed for {path}: {detail}")]
    FormatConversion { path: PathBuf, detail: String },
}

impl PipelineError {
    pub fn missing_input(path: impl AsRef<Path>, source: io::Error) -> Self {
        PipelineError::MissingInput {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_schema(column: impl Into<String>, path: impl AsRef<Path>) -> Self {
        PipelineError::InvalidSchema {
            column: column.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}
