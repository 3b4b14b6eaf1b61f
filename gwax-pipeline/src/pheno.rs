//! Sample phenotype joiner: pushes an external sample→phenotype mapping into
//! cohort pedigree (.fam) files in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gwax_core::{PipelineError, MISSING_PHENOTYPE};

/// Column holding the individual ID in a pedigree row.
const FAM_IID_COL: usize = 1;
/// Column holding the phenotype slot in a pedigree row.
const FAM_PHENO_COL: usize = 5;
/// A pedigree row has exactly six whitespace-delimited fields.
const FAM_COLS: usize = 6;

/// Load the sample→phenotype mapping from a whitespace-delimited file with a
/// header row. The individual-ID column must be named `IID`; the phenotype
/// column name comes from the run configuration.
pub fn load_phenotype_map(
    path: &Path,
    phenotype_column: &str,
) -> Result<HashMap<String, f64>, PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::missing_input(path, e))?;
    let mut lines = content.lines();

    let header: Vec<&str> = lines.next().unwrap_or("").split_whitespace().collect();
    let iid_idx = header
        .iter()
        .position(|h| h.eq_ignore_ascii_case("IID"))
        .ok_or_else(|| PipelineError::invalid_schema("IID", path))?;
    let pheno_idx = header
        .iter()
        .position(|h| *h == phenotype_column)
        .ok_or_else(|| PipelineError::InvalidPhenotype {
            column: phenotype_column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut map = HashMap::new();
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let (Some(iid), Some(raw)) = (fields.get(iid_idx), fields.get(pheno_idx)) else {
            continue;
        };
        if let Ok(value) = raw.parse::<f64>() {
            map.insert(iid.to_string(), value);
        }
    }
    Ok(map)
}

/// Verify that the phenotype column exists in the mapping file header.
/// Used by the association runner before invoking the engine.
pub fn verify_phenotype_column(path: &Path, phenotype_column: &str) -> Result<(), PipelineError> {
    load_phenotype_map(path, phenotype_column).map(|_| ())
}

/// Rewrite each pedigree file so the phenotype slot holds the mapped value
/// for its individual ID, or `-9` when the ID has no mapping. Row order and
/// the other five fields are preserved; the file is overwritten in place.
///
/// Returns the number of files updated.
pub fn join_phenotypes(
    map: &HashMap<String, f64>,
    fam_paths: &[PathBuf],
) -> Result<usize, PipelineError> {
    for fam in fam_paths {
        update_fam(fam, map)?;
        eprintln!("  updated {}", fam.display());
    }
    Ok(fam_paths.len())
}

fn update_fam(path: &Path, map: &HashMap<String, f64>) -> Result<(), PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::missing_input(path, e))?;

    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields: Vec<String> = line.split_whitespace().map(|s| s.to_string()).collect();
        if fields.len() != FAM_COLS {
            return Err(PipelineError::invalid_schema(
                format!("{} pedigree columns (got {})", FAM_COLS, fields.len()),
                path,
            ));
        }
        fields[FAM_PHENO_COL] = format_phenotype(map.get(&fields[FAM_IID_COL]));
        out.push_str(&fields.join(" "));
        out.push('\n');
    }

    fs::write(path, out).map_err(|e| PipelineError::missing_input(path, e))
}

/// Case/control phenotypes are written as integers; anything fractional is
/// kept verbatim. Missing maps to the `-9` sentinel.
fn format_phenotype(value: Option<&f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", *v as i64),
        Some(v) => format!("{}", v),
        None => MISSING_PHENOTYPE.to_string(),
    }
}
