//! Loading and normalization of the curated candidate-variant list.

use std::path::{Path, PathBuf};

use gwax_core::columns::pick_column;
use gwax_core::table::AssociationTable;
use gwax_core::PipelineError;

/// The normalized candidate set: unique identifiers in first-seen order.
#[derive(Clone, Debug)]
pub struct CandidateSet {
    pub path: PathBuf,
    /// Header of the column the identifiers were read from.
    pub column: String,
    /// True when no keyword matched and the first column was used.
    pub used_fallback: bool,
    pub ids: Vec<String>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Load the candidate list from a spreadsheet-like delimited file.
///
/// The identifier column is picked by keyword heuristic; with no match the
/// first column is used (a warning is recorded, never a failure). Values are
/// trimmed, empty/NA-like entries dropped, and duplicates removed keeping
/// the first occurrence.
pub fn load_candidates(path: &Path, keywords: &[String]) -> Result<CandidateSet, PipelineError> {
    let table = AssociationTable::load(path)?;
    let choice = pick_column(&table.headers, keywords)
        .ok_or_else(|| PipelineError::invalid_schema("<identifier column>", path))?;
    let col = choice.index();

    let mut seen = std::collections::HashSet::new();
    let mut ids = Vec::new();
    for row in 0..table.n_rows() {
        let value = table.cell(row, col).trim();
        if value.is_empty()
            || value.eq_ignore_ascii_case("nan")
            || value.eq_ignore_ascii_case("na")
        {
            continue;
        }
        if seen.insert(value.to_string()) {
            ids.push(value.to_string());
        }
    }

    Ok(CandidateSet {
        path: path.to_path_buf(),
        column: table.headers[col].clone(),
        used_fallback: choice.is_fallback(),
        ids,
    })
}
