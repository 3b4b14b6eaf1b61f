//! gwax-xref: cross-references a curated candidate-variant list against an
//! association table and emits significance-stratified reports.
//!
//! Decoupled from the integration pipeline: it can rerun against any prior
//! association table.

pub mod candidates;
pub mod export;
pub mod inspect;
pub mod report;
pub mod stats;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use gwax_core::columns::{find_p_value_column, pick_column};
use gwax_core::table::{parse_p_value, AssociationTable};
use gwax_core::{PipelineError, RunConfig};

use candidates::load_candidates;
use stats::{significance_stats, top_k_indices, SignificanceStats};

/// File references the report was produced from.
#[derive(Clone, Debug, Serialize)]
pub struct InputFiles {
    pub candidate_file: String,
    pub association_file: String,
}

/// Headline counts of the cross-reference.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub total_candidates: usize,
    pub total_variants_tested: usize,
    pub found_count: usize,
    pub not_found_count: usize,
    pub match_percentage: f64,
    pub candidate_column: String,
    pub association_column: String,
}

/// Full identifier lists plus p-value stratification and the top rows.
#[derive(Clone, Debug, Serialize)]
pub struct DetailedResults {
    pub p_value_statistics: Option<SignificanceStats>,
    /// Column order for `top_significant` row values.
    pub columns: Vec<String>,
    pub top_significant: Vec<Vec<String>>,
    pub found_snps: Vec<String>,
    pub not_found_snps: Vec<String>,
}

/// The structured report artifact, serialized as-is to JSON.
#[derive(Clone, Debug, Serialize)]
pub struct CrossrefReport {
    pub analysis_date: String,
    pub input_files: InputFiles,
    pub summary: Summary,
    pub detailed_results: DetailedResults,
}

/// Report plus the joined detail rows (kept out of the JSON payload) and the
/// artifact locations.
#[derive(Clone, Debug)]
pub struct CrossrefOutcome {
    pub report: CrossrefReport,
    pub detail_rows: Vec<Vec<String>>,
    pub detailed_csv: PathBuf,
    pub json_report: PathBuf,
    pub text_summary: PathBuf,
}

/// Match the candidate list against the association table and write the
/// three report artifacts into the configured output directory.
pub fn cross_reference(
    assoc_path: &Path,
    cfg: &RunConfig,
) -> Result<CrossrefOutcome, PipelineError> {
    eprintln!("Loading candidate list from {}...", cfg.candidate_file.display());
    let candidates = load_candidates(&cfg.candidate_file, &cfg.id_keywords)?;
    if candidates.used_fallback {
        eprintln!(
            "  warning: no identifier-like column found, using first column '{}'",
            candidates.column
        );
    }
    eprintln!(
        "  {} unique candidates from column '{}'",
        candidates.len(),
        candidates.column
    );

    eprintln!("Loading association results from {}...", assoc_path.display());
    let table = AssociationTable::load(assoc_path)?;
    let id_choice = pick_column(&table.headers, &cfg.id_keywords)
        .ok_or_else(|| PipelineError::invalid_schema("<identifier column>", assoc_path))?;
    if id_choice.is_fallback() {
        eprintln!(
            "  warning: no identifier-like column found, using first column '{}'",
            table.headers[id_choice.index()]
        );
    }
    let id_col = id_choice.index();
    eprintln!(
        "  {} tested variants, matching on column '{}'",
        table.n_rows(),
        table.headers[id_col]
    );

    // Identifier domain of the table, for O(1) membership tests.
    let tested: HashSet<&str> = (0..table.n_rows())
        .map(|row| table.cell(row, id_col).trim())
        .collect();

    let mut found = Vec::new();
    let mut not_found = Vec::new();
    for id in &candidates.ids {
        if tested.contains(id.as_str()) {
            found.push(id.clone());
        } else {
            not_found.push(id.clone());
        }
    }

    let match_percentage = if candidates.is_empty() {
        0.0
    } else {
        found.len() as f64 / candidates.len() as f64 * 100.0
    };
    eprintln!(
        "  found {} of {} candidates ({:.1}%)",
        found.len(),
        candidates.len(),
        match_percentage
    );

    // Join found identifiers back to the full table rows, in table order.
    let found_set: HashSet<&str> = found.iter().map(String::as_str).collect();
    let detail_rows: Vec<Vec<String>> = (0..table.n_rows())
        .filter(|&row| found_set.contains(table.cell(row, id_col).trim()))
        .map(|row| table.rows[row].clone())
        .collect();

    let (p_value_statistics, top_significant) = match find_p_value_column(&table.headers) {
        Some(p_col) => {
            let p_values: Vec<Option<f64>> = detail_rows
                .iter()
                .map(|row| parse_p_value(row.get(p_col).map(String::as_str).unwrap_or("")))
                .collect();
            let stats = significance_stats(&p_values, &cfg.thresholds);
            let k = cfg.top_k.min(detail_rows.len());
            let top = top_k_indices(&p_values, k)
                .into_iter()
                .map(|i| detail_rows[i].clone())
                .collect();
            (Some(stats), top)
        }
        None => {
            eprintln!("  no p-value column in association table, skipping stratification");
            (None, Vec::new())
        }
    };

    let report = CrossrefReport {
        analysis_date: chrono::Local::now().to_rfc3339(),
        input_files: InputFiles {
            candidate_file: cfg.candidate_file.display().to_string(),
            association_file: assoc_path.display().to_string(),
        },
        summary: Summary {
            total_candidates: candidates.len(),
            total_variants_tested: table.n_rows(),
            found_count: found.len(),
            not_found_count: not_found.len(),
            match_percentage,
            candidate_column: candidates.column.clone(),
            association_column: table.headers[id_col].clone(),
        },
        detailed_results: DetailedResults {
            p_value_statistics,
            columns: table.headers.clone(),
            top_significant,
            found_snps: found,
            not_found_snps: not_found,
        },
    };

    let artifacts = report::write_artifacts(&report, &table.headers, &detail_rows, &cfg.output_dir)?;

    Ok(CrossrefOutcome {
        report,
        detail_rows,
        detailed_csv: artifacts.0,
        json_report: artifacts.1,
        text_summary: artifacts.2,
    })
}

/// Run the cross-reference as a standalone report step.
///
/// Errors are caught at this boundary and narrated with their context; the
/// caller gets `None` as a failure indicator instead of a propagated fault,
/// so reports from earlier successful stages are never lost to a crash here.
pub fn run_standalone(assoc_path: &Path, cfg: &RunConfig) -> Option<CrossrefOutcome> {
    match cross_reference(assoc_path, cfg) {
        Ok(outcome) => {
            eprintln!("✓ cross-reference reports written to {}", cfg.output_dir.display());
            Some(outcome)
        }
        Err(err) => {
            eprintln!("✗ cross-reference failed: {}", err);
            None
        }
    }
}
