//! Quick inspection of an association table: shape, significance counts,
//! top variants, and per-chromosome tallies. Narration only, no artifact.

use std::collections::BTreeMap;
use std::path::Path;

use gwax_core::columns::{find_p_value_column, pick_column};
use gwax_core::table::{parse_p_value, AssociationTable};
use gwax_core::{PipelineError, RunConfig};

use crate::stats::{significance_stats, top_k_indices};

/// Accepted header spellings for the chromosome column.
const CHROM_NAMES: &[&str] = &["chr", "chrom", "#chrom", "chromosome"];

pub fn inspect_assoc_table(path: &Path, cfg: &RunConfig) -> Result<(), PipelineError> {
    let table = AssociationTable::load(path)?;

    println!("=== ASSOCIATION TABLE: {} ===", path.display());
    println!("Rows: {}", table.n_rows());
    println!("Columns: {}", table.headers.join(", "));

    if let Some(p_col) = find_p_value_column(&table.headers) {
        let p_values: Vec<Option<f64>> = (0..table.n_rows())
            .map(|row| parse_p_value(table.cell(row, p_col)))
            .collect();
        let stats = significance_stats(&p_values, &cfg.thresholds);

        println!();
        println!("P-VALUE SUMMARY:");
        println!("- With p-value: {}", stats.total_with_pvalue);
        println!("- Significant (p < 0.05): {}", stats.significant_005);
        println!("- Highly significant (p < 0.001): {}", stats.significant_001);
        println!(
            "- Genome-wide significant (p < 5e-8): {}",
            stats.genome_wide_significant
        );

        let id_col = pick_column(&table.headers, &cfg.id_keywords).map(|c| c.index());
        // Rows without a p-value are skipped, so the count comes from the
        // selection itself, not from the table size.
        let top = top_k_indices(&p_values, cfg.top_k);
        println!();
        println!("TOP {} VARIANTS BY P-VALUE:", top.len());
        for row in top {
            let id = id_col.map(|c| table.cell(row, c)).unwrap_or("?");
            println!("- {}  p={}", id, table.cell(row, p_col));
        }
    } else {
        println!();
        println!("No p-value column found.");
    }

    if let Some(chr_col) = table
        .headers
        .iter()
        .position(|h| CHROM_NAMES.iter().any(|n| h.eq_ignore_ascii_case(n)))
    {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in 0..table.n_rows() {
            *counts
                .entry(table.cell(row, chr_col).to_string())
                .or_insert(0) += 1;
        }
        println!();
        println!("VARIANTS PER CHROMOSOME:");
        for (chrom, count) in counts {
            println!("- {}: {}", chrom, count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn inspects_table_without_panicking() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "CHR\tSNP\tBP\tP").unwrap();
        writeln!(f, "1\trs1\t100\t0.5").unwrap();
        writeln!(f, "2\trs2\t200\t1e-9").unwrap();
        writeln!(f, "2\trs3\t300\tNA").unwrap();

        let cfg = RunConfig::new("pheno", vec![], "cands", "out");
        inspect_assoc_table(f.path(), &cfg).unwrap();
    }

    #[test]
    fn top_listing_counts_only_rows_with_pvalues() {
        // Same shape as the smoke-test table: three rows, one without a
        // p-value. The announced top count must match the selection.
        let p_values = vec![
            parse_p_value("0.5"),
            parse_p_value("1e-9"),
            parse_p_value("NA"),
        ];
        assert_eq!(top_k_indices(&p_values, 10).len(), 2);
    }

    #[test]
    fn missing_table_is_missing_input() {
        let cfg = RunConfig::new("pheno", vec![], "cands", "out");
        let err = inspect_assoc_table(Path::new("/no/such/file"), &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }
}
