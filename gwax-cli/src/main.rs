use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gwax_core::RunConfig;
use gwax_pipeline::engine::ProcessEngine;
use gwax_pipeline::{assoc, convert, merge, pheno};
use gwax_xref::{export, inspect};

#[derive(Parser)]
#[command(
    name = "gwax",
    version,
    about = "gwax: cohort integration, association testing, and candidate cross-reference"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: phenotype join, cohort merge, format
    /// conversion, association test, candidate cross-reference
    #[command(after_help = "EXAMPLES:
    # Merge three cohorts, test against PHENO, and check a candidate list
    gwax run --pheno merged_all.phenotype --cohorts data/c1/c1_binary data/c2/c2_binary data/c3/c3_binary \\
        --candidates candidates.csv --out-dir results

    # Same, with explicit engine binaries and a 2-hour engine timeout
    gwax run --pheno merged_all.phenotype --cohorts data/c1/c1_binary data/c2/c2_binary \\
        --candidates candidates.csv --out-dir results \\
        --plink tools/plink --plink2 tools/plink2 --engine-timeout-secs 7200")]
    Run {
        /// Sample→phenotype mapping file (whitespace-delimited, IID column)
        #[arg(long)]
        pheno: PathBuf,
        /// Phenotype column name in the mapping file
        #[arg(long, default_value = "PHENO")]
        pheno_name: String,
        /// Cohort binary fileset prefixes; the first is the merge reference
        #[arg(long, num_args = 1.., required = true)]
        cohorts: Vec<PathBuf>,
        /// Candidate variant list (CSV/TSV)
        #[arg(long)]
        candidates: PathBuf,
        /// Output directory for all artifacts
        #[arg(long)]
        out_dir: PathBuf,
        /// Merge engine binary
        #[arg(long, default_value = "plink")]
        plink: PathBuf,
        /// Association engine binary
        #[arg(long, default_value = "plink2")]
        plink2: PathBuf,
        /// Kill an engine process after this many seconds
        #[arg(long)]
        engine_timeout_secs: Option<u64>,
    },

    /// Join phenotype values into cohort pedigree (.fam) files in place
    JoinPheno {
        #[arg(long)]
        pheno: PathBuf,
        #[arg(long, default_value = "PHENO")]
        pheno_name: String,
        /// Pedigree files to update
        #[arg(long, num_args = 1.., required = true)]
        fam: Vec<PathBuf>,
    },

    /// Merge cohort binary filesets into one unified dataset
    Merge {
        #[arg(long, num_args = 1.., required = true)]
        cohorts: Vec<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value = "plink")]
        plink: PathBuf,
        #[arg(long)]
        engine_timeout_secs: Option<u64>,
    },

    /// Convert a merged fileset to the association engine's native encoding
    Convert {
        /// Prefix of the merged binary fileset
        #[arg(long)]
        bfile: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value = "plink2")]
        plink2: PathBuf,
        #[arg(long)]
        engine_timeout_secs: Option<u64>,
    },

    /// Run the association test over a converted dataset
    Assoc {
        /// Prefix of the engine-native fileset
        #[arg(long)]
        pfile: PathBuf,
        #[arg(long)]
        pheno: PathBuf,
        #[arg(long, default_value = "PHENO")]
        pheno_name: String,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value = "plink2")]
        plink2: PathBuf,
        #[arg(long)]
        engine_timeout_secs: Option<u64>,
    },

    /// Cross-reference a candidate list against an association table
    Xref {
        #[arg(long)]
        candidates: PathBuf,
        /// Association table (any prior run's output works)
        #[arg(long)]
        assoc: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Summarize an association table (shape, significance, top variants)
    Inspect {
        #[arg(long)]
        assoc: PathBuf,
    },

    /// Re-delimit an association table as CSV
    Export {
        #[arg(long)]
        assoc: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Output delimiter (single ASCII character)
        #[arg(long, default_value = ";")]
        delimiter: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pheno,
            pheno_name,
            cohorts,
            candidates,
            out_dir,
            plink,
            plink2,
            engine_timeout_secs,
        } => {
            let mut cfg = RunConfig::new(pheno, cohorts, candidates, out_dir);
            cfg.phenotype_column = pheno_name;
            cfg.merge_engine = plink;
            cfg.assoc_engine = plink2;
            cfg.engine_timeout = engine_timeout_secs.map(Duration::from_secs);
            run_full(&cfg)
        }

        Commands::JoinPheno {
            pheno,
            pheno_name,
            fam,
        } => {
            eprintln!("Joining phenotypes from {}...", pheno.display());
            let map = pheno::load_phenotype_map(&pheno, &pheno_name)?;
            let updated = pheno::join_phenotypes(&map, &fam)?;
            eprintln!("✓ updated {} pedigree file(s)", updated);
            Ok(())
        }

        Commands::Merge {
            cohorts,
            out_dir,
            plink,
            engine_timeout_secs,
        } => {
            let mut cfg = stage_config(cohorts, out_dir);
            cfg.merge_engine = plink;
            cfg.engine_timeout = engine_timeout_secs.map(Duration::from_secs);
            let engine = ProcessEngine::new(cfg.engine_timeout);
            eprintln!("Merging cohorts...");
            let merged = merge::consolidate(&cfg, &engine)?;
            eprintln!("✓ merged dataset at {}", merged.display());
            Ok(())
        }

        Commands::Convert {
            bfile,
            out_dir,
            plink2,
            engine_timeout_secs,
        } => {
            let mut cfg = stage_config(vec![], out_dir);
            cfg.assoc_engine = plink2;
            cfg.engine_timeout = engine_timeout_secs.map(Duration::from_secs);
            let engine = ProcessEngine::new(cfg.engine_timeout);
            eprintln!("Converting {} to engine-native encoding...", bfile.display());
            let unified = convert::adapt_dataset(&cfg, &engine, &bfile)?;
            eprintln!("✓ unified dataset at {}", unified.display());
            Ok(())
        }

        Commands::Assoc {
            pfile,
            pheno,
            pheno_name,
            out_dir,
            plink2,
            engine_timeout_secs,
        } => {
            let mut cfg = stage_config(vec![], out_dir);
            cfg.phenotype_file = pheno;
            cfg.phenotype_column = pheno_name;
            cfg.assoc_engine = plink2;
            cfg.engine_timeout = engine_timeout_secs.map(Duration::from_secs);
            let engine = ProcessEngine::new(cfg.engine_timeout);
            eprintln!("Running association test...");
            let table = assoc::run_association(&cfg, &engine, &pfile)?;
            eprintln!("✓ association table at {}", table.display());
            Ok(())
        }

        Commands::Xref {
            candidates,
            assoc: assoc_path,
            out_dir,
        } => {
            let mut cfg = stage_config(vec![], out_dir);
            cfg.candidate_file = candidates;
            assoc::verify_assoc_table(&assoc_path)?;
            // Standalone boundary: failures are reported, not propagated.
            match gwax_xref::run_standalone(&assoc_path, &cfg) {
                Some(_) => Ok(()),
                None => std::process::exit(1),
            }
        }

        Commands::Inspect { assoc: assoc_path } => {
            let cfg = stage_config(vec![], PathBuf::from("."));
            inspect::inspect_assoc_table(&assoc_path, &cfg)?;
            Ok(())
        }

        Commands::Export {
            assoc: assoc_path,
            output,
            delimiter,
        } => {
            let delim = parse_delimiter(&delimiter)?;
            let rows = export::export_assoc_table(&assoc_path, &output, delim)?;
            eprintln!("✓ wrote {} row(s) to {}", rows, output.display());
            Ok(())
        }
    }
}

/// Full pipeline, strictly sequential; each stage completes before the next.
fn run_full(cfg: &RunConfig) -> Result<()> {
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;
    let engine = ProcessEngine::new(cfg.engine_timeout);

    eprintln!("[1/5] Joining phenotypes from {}...", cfg.phenotype_file.display());
    let map = pheno::load_phenotype_map(&cfg.phenotype_file, &cfg.phenotype_column)?;
    let fam_files: Vec<PathBuf> = cfg.cohorts.iter().map(|c| RunConfig::fam_path(c)).collect();
    pheno::join_phenotypes(&map, &fam_files)?;
    eprintln!("✓ phenotypes joined into {} cohort(s)", fam_files.len());

    eprintln!("[2/5] Consolidating cohorts...");
    let merged = merge::consolidate(cfg, &engine)?;
    eprintln!("✓ merged dataset at {}", merged.display());

    eprintln!("[3/5] Converting to engine-native encoding...");
    let unified = convert::adapt_dataset(cfg, &engine, &merged)?;
    eprintln!("✓ unified dataset at {}", unified.display());

    eprintln!("[4/5] Running association test...");
    let assoc_table = assoc::run_association(cfg, &engine, &unified)?;
    eprintln!("✓ association table at {}", assoc_table.display());

    eprintln!("[5/5] Cross-referencing candidates...");
    if gwax_xref::run_standalone(&assoc_table, cfg).is_none() {
        // Earlier artifacts stay on disk; the run itself still fails.
        bail!("cross-reference step failed (association table retained at {})", assoc_table.display());
    }

    eprintln!("✓ Done. All results in {}", cfg.output_dir.display());
    Ok(())
}

/// Config skeleton for single-stage subcommands; unused fields keep defaults.
fn stage_config(cohorts: Vec<PathBuf>, out_dir: PathBuf) -> RunConfig {
    RunConfig::new(
        out_dir.join("merged_all.phenotype"),
        cohorts,
        out_dir.join("candidates.csv"),
        out_dir,
    )
}

fn parse_delimiter(raw: &str) -> Result<u8> {
    let bytes = raw.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", raw);
    }
    Ok(bytes[0])
}
