use std::path::{Path, PathBuf};
use std::time::Duration;

/// Phenotype sentinel for individuals absent from the mapping (PLINK convention).
pub const MISSING_PHENOTYPE: i64 = -9;

/// Keywords used to locate a variant-identifier column by case-insensitive
/// substring match, tried in column order.
pub const ID_KEYWORDS: &[&str] = &["snp", "rs", "variant", "id"];

/// Accepted header spellings for the p-value column (exact, case-insensitive).
pub const P_VALUE_NAMES: &[&str] = &["p", "pval", "pvalue", "p_value", "p-value"];

/// Significance thresholds for stratifying matched variants.
#[derive(Clone, Copy, Debug)]
pub struct SignificanceThresholds {
    pub nominal: f64,
    pub strong: f64,
    pub genome_wide: f64,
}

impl Default for SignificanceThresholds {
    fn default() -> Self {
        SignificanceThresholds {
            nominal: 0.05,
            strong: 0.001,
            genome_wide: 5e-8,
        }
    }
}

/// Per-run configuration, constructed once and passed by reference.
///
/// Cohorts are PLINK binary fileset prefixes (`prefix` + `.bed/.bim/.fam`);
/// the first entry is the frozen reference for the merge.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub phenotype_file: PathBuf,
    pub phenotype_column: String,
    pub cohorts: Vec<PathBuf>,
    pub candidate_file: PathBuf,
    pub output_dir: PathBuf,
    pub merge_engine: PathBuf,
    pub assoc_engine: PathBuf,
    pub engine_timeout: Option<Duration>,
    pub thresholds: SignificanceThresholds,
    pub id_keywords: Vec<String>,
    pub top_k: usize,
}

impl RunConfig {
    pub fn new(
        phenotype_file: impl Into<PathBuf>,
        cohorts: Vec<PathBuf>,
        candidate_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        RunConfig {
            phenotype_file: phenotype_file.into(),
            phenotype_column: "PHENO".to_string(),
            cohorts,
            candidate_file: candidate_file.into(),
            output_dir: output_dir.into(),
            merge_engine: PathBuf::from("plink"),
            assoc_engine: PathBuf::from("plink2"),
            engine_timeout: None,
            thresholds: SignificanceThresholds::default(),
            id_keywords: ID_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            top_k: 10,
        }
    }

    /// Pedigree file for a cohort prefix.
    pub fn fam_path(prefix: &Path) -> PathBuf {
        prefix.with_extension("fam")
    }

    /// Plain-text list of the non-reference cohorts, one prefix per line.
    pub fn merge_list_path(&self) -> PathBuf {
        self.output_dir.join("merge_list.txt")
    }

    /// Prefix of the merged dataset in the merge-native (bed) encoding.
    pub fn merged_prefix(&self) -> PathBuf {
        self.output_dir.join("merged_all_bed")
    }

    /// Prefix of the unified dataset in the engine-native (pgen) encoding.
    pub fn unified_prefix(&self) -> PathBuf {
        self.output_dir.join("merged_all")
    }

    /// Prefix for the association engine output.
    pub fn assoc_prefix(&self) -> PathBuf {
        self.output_dir.join("gwas_results")
    }
}
