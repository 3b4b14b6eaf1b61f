//! The three report artifacts: detailed CSV, structured JSON, and a
//! human-readable text summary. All are fully regenerated on each run.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gwax_core::PipelineError;

use crate::CrossrefReport;

pub const DETAILED_CSV: &str = "found_candidates_detailed.csv";
pub const JSON_REPORT: &str = "crossref_report.json";
pub const TEXT_SUMMARY: &str = "analysis_summary.txt";

/// Identifier listings in the text summary are cut off after this many
/// entries, with an explicit "... and N more" suffix.
const LIST_LIMIT: usize = 20;

/// Write all three artifacts; returns (detailed CSV, JSON, text) paths.
pub fn write_artifacts(
    report: &CrossrefReport,
    headers: &[String],
    detail_rows: &[Vec<String>],
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf, PathBuf), PipelineError> {
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::missing_input(output_dir, e))?;

    let csv_path = output_dir.join(DETAILED_CSV);
    write_detailed_csv(&csv_path, headers, detail_rows)?;

    let json_path = output_dir.join(JSON_REPORT);
    write_json_report(&json_path, report)?;

    let text_path = output_dir.join(TEXT_SUMMARY);
    write_text_summary(&text_path, report)?;

    Ok((csv_path, json_path, text_path))
}

fn write_detailed_csv(
    path: &Path,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| PipelineError::FormatConversion {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    wtr.write_record(headers)
        .and_then(|_| {
            for row in rows {
                wtr.write_record(row)?;
            }
            wtr.flush().map_err(csv::Error::from)
        })
        .map_err(|e| PipelineError::FormatConversion {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}

fn write_json_report(path: &Path, report: &CrossrefReport) -> Result<(), PipelineError> {
    let payload =
        serde_json::to_string_pretty(report).map_err(|e| PipelineError::FormatConversion {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    fs::write(path, payload).map_err(|e| PipelineError::missing_input(path, e))
}

fn write_text_summary(path: &Path, report: &CrossrefReport) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::missing_input(path, e))?;
    let mut w = BufWriter::new(file);
    render_text_summary(&mut w, report).map_err(|e| PipelineError::missing_input(path, e))
}

fn render_text_summary(w: &mut impl Write, report: &CrossrefReport) -> std::io::Result<()> {
    writeln!(w, "=== CANDIDATE VARIANT CROSS-REFERENCE ===")?;
    writeln!(w)?;
    writeln!(w, "Analysis date: {}", report.analysis_date)?;
    writeln!(w)?;
    writeln!(w, "INPUT FILES:")?;
    writeln!(w, "- Candidate list: {}", report.input_files.candidate_file)?;
    writeln!(
        w,
        "- Association results: {}",
        report.input_files.association_file
    )?;
    writeln!(w)?;

    let s = &report.summary;
    writeln!(w, "RESULTS:")?;
    writeln!(w, "- Total candidate variants: {}", s.total_candidates)?;
    writeln!(w, "- Found in association results: {}", s.found_count)?;
    writeln!(w, "- Not found: {}", s.not_found_count)?;
    writeln!(w, "- Match percentage: {:.1}%", s.match_percentage)?;
    writeln!(w)?;

    if let Some(stats) = &report.detailed_results.p_value_statistics {
        writeln!(w, "P-VALUE STATISTICS:")?;
        writeln!(w, "- Significant (p < 0.05): {}", stats.significant_005)?;
        writeln!(
            w,
            "- Highly significant (p < 0.001): {}",
            stats.significant_001
        )?;
        writeln!(
            w,
            "- Genome-wide significant (p < 5e-8): {}",
            stats.genome_wide_significant
        )?;
        writeln!(
            w,
            "- Minimum p-value: {}",
            stats
                .min_pvalue
                .map(|v| v.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        )?;
        writeln!(
            w,
            "- Median p-value: {}",
            stats
                .median_pvalue
                .map(|v| v.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        )?;
        writeln!(w)?;
    }

    writeln!(w, "FOUND VARIANTS:")?;
    write_truncated_list(w, &report.detailed_results.found_snps)?;
    writeln!(w)?;
    writeln!(w, "NOT FOUND VARIANTS:")?;
    write_truncated_list(w, &report.detailed_results.not_found_snps)?;

    w.flush()
}

fn write_truncated_list(w: &mut impl Write, ids: &[String]) -> std::io::Result<()> {
    for id in ids.iter().take(LIST_LIMIT) {
        writeln!(w, "- {}", id)?;
    }
    if ids.len() > LIST_LIMIT {
        writeln!(w, "... and {} more", ids.len() - LIST_LIMIT)?;
    }
    Ok(())
}
