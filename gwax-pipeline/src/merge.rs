//! Cohort consolidator: merges independently genotyped cohorts into one
//! unified binary dataset via the external merge engine.
//!
//! The first cohort is the frozen reference; the rest are listed in a
//! merge-list file and appended by the engine. Output is staged in a
//! temporary directory and only published (renamed into place) when the
//! merge succeeds, so a failed run never leaves a partial unified dataset.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gwax_core::{PipelineError, RunConfig};

use crate::engine::{Engine, EngineRequest};
use crate::prefix_with_ext;

const BED_EXTS: [&str; 3] = ["bed", "bim", "fam"];
const STAGE_NAME: &str = "cohort consolidation";

/// Merge all configured cohorts into one dataset under the output directory.
/// Returns the prefix of the published merged fileset.
pub fn consolidate(cfg: &RunConfig, engine: &dyn Engine) -> Result<PathBuf, PipelineError> {
    let reference = cfg.cohorts.first().ok_or_else(|| {
        PipelineError::missing_input(
            &cfg.output_dir,
            io::Error::new(io::ErrorKind::InvalidInput, "no cohort datasets configured"),
        )
    })?;

    for cohort in &cfg.cohorts {
        verify_fileset(cohort)?;
    }
    fs::create_dir_all(&cfg.output_dir)
        .map_err(|e| PipelineError::missing_input(&cfg.output_dir, e))?;

    let merged = cfg.merged_prefix();
    let staging = tempfile::Builder::new()
        .prefix(".merge-stage-")
        .tempdir_in(&cfg.output_dir)
        .map_err(|e| PipelineError::missing_input(&cfg.output_dir, e))?;
    let stage_prefix = staging.path().join("merged");

    if cfg.cohorts.len() == 1 {
        // Nothing to merge; the unified dataset is a copy of the reference.
        eprintln!("  single cohort, copying {}", reference.display());
        for ext in BED_EXTS {
            fs::copy(prefix_with_ext(reference, ext), prefix_with_ext(&stage_prefix, ext))
                .map_err(|e| PipelineError::missing_input(prefix_with_ext(reference, ext), e))?;
        }
    } else {
        let list_path = write_merge_list(cfg)?;
        eprintln!(
            "  merging {} cohorts into reference {}",
            cfg.cohorts.len(),
            reference.display()
        );

        let request = EngineRequest::new(
            STAGE_NAME,
            &cfg.merge_engine,
            cfg.output_dir.join("merge_engine.log"),
        )
        .arg("--bfile")
        .arg(reference.display().to_string())
        .arg("--merge-list")
        .arg(list_path.display().to_string())
        .arg("--make-bed")
        .arg("--allow-no-sex")
        .arg("--out")
        .arg(stage_prefix.display().to_string());

        if let Err(err) = engine.run(&request) {
            return Err(classify_merge_failure(err, reference, &stage_prefix));
        }
    }

    publish(&stage_prefix, &merged)?;
    Ok(merged)
}

/// Write the plain-text merge list: one non-reference cohort prefix per line.
fn write_merge_list(cfg: &RunConfig) -> Result<PathBuf, PipelineError> {
    let path = cfg.merge_list_path();
    let mut content = String::new();
    for cohort in &cfg.cohorts[1..] {
        content.push_str(&cohort.display().to_string());
        content.push('\n');
    }
    fs::write(&path, content).map_err(|e| PipelineError::missing_input(&path, e))?;
    Ok(path)
}

/// A merge engine failure with a `.missnp` sidecar means incompatible marker
/// sets (allele conflicts); anything else stays an engine-execution failure.
fn classify_merge_failure(
    err: PipelineError,
    reference: &Path,
    stage_prefix: &Path,
) -> PipelineError {
    let missnp = prefix_with_ext(stage_prefix, "missnp");
    let missnp_merge = PathBuf::from(format!("{}-merge.missnp", stage_prefix.display()));
    for candidate in [&missnp_merge, &missnp] {
        if let Ok(content) = fs::read_to_string(candidate) {
            let conflicts = content.lines().filter(|l| !l.trim().is_empty()).count();
            return PipelineError::MergeConflict {
                reference: reference.to_path_buf(),
                detail: format!(
                    "{} variant(s) with conflicting alleles (see {})",
                    conflicts,
                    candidate.display()
                ),
            };
        }
    }
    match err {
        PipelineError::EngineExecution { detail, .. } => PipelineError::MergeConflict {
            reference: reference.to_path_buf(),
            detail,
        },
        other => other,
    }
}

/// Move the staged fileset to its final prefix. All three files must exist;
/// otherwise the merge is treated as failed and nothing is published.
fn publish(stage_prefix: &Path, merged_prefix: &Path) -> Result<(), PipelineError> {
    for ext in BED_EXTS {
        let staged = prefix_with_ext(stage_prefix, ext);
        if !staged.exists() {
            return Err(PipelineError::FormatConversion {
                path: staged,
                detail: "merge engine reported success but produced no output".to_string(),
            });
        }
    }
    for ext in BED_EXTS {
        let staged = prefix_with_ext(stage_prefix, ext);
        let target = prefix_with_ext(merged_prefix, ext);
        fs::rename(&staged, &target).map_err(|e| PipelineError::missing_input(&staged, e))?;
    }
    Ok(())
}

fn verify_fileset(prefix: &Path) -> Result<(), PipelineError> {
    for ext in BED_EXTS {
        let path = prefix_with_ext(prefix, ext);
        if !path.exists() {
            return Err(PipelineError::missing_input(
                &path,
                io::Error::new(io::ErrorKind::NotFound, "cohort fileset member not found"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FnEngine;
    use gwax_core::PipelineError;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn make_cohort(dir: &Path, name: &str) -> PathBuf {
        let prefix = dir.join(name);
        for ext in BED_EXTS {
            fs::write(prefix_with_ext(&prefix, ext), format!("{} {}", name, ext)).unwrap();
        }
        prefix
    }

    fn config(dir: &Path, cohorts: Vec<PathBuf>) -> RunConfig {
        RunConfig::new(
            dir.join("pheno.txt"),
            cohorts,
            dir.join("candidates.csv"),
            dir.join("out"),
        )
    }

    #[test]
    fn merges_and_publishes_fileset() {
        let dir = tempdir().unwrap();
        let a = make_cohort(dir.path(), "cohort_a");
        let b = make_cohort(dir.path(), "cohort_b");
        let cfg = config(dir.path(), vec![a.clone(), b.clone()]);

        let engine = FnEngine(|req: &EngineRequest| {
            // The real engine writes the fileset at --out.
            let out = PathBuf::from(&req.args[req.args.len() - 1]);
            for ext in BED_EXTS {
                fs::write(prefix_with_ext(&out, ext), "merged").unwrap();
            }
            Ok(())
        });

        let merged = consolidate(&cfg, &engine).unwrap();
        for ext in BED_EXTS {
            assert!(prefix_with_ext(&merged, ext).exists());
        }

        // Merge list holds exactly the non-reference cohorts, in order.
        let list = fs::read_to_string(cfg.merge_list_path()).unwrap();
        assert_eq!(list.trim(), b.display().to_string());

        // Inputs are untouched.
        assert_eq!(
            fs::read_to_string(prefix_with_ext(&a, "bed")).unwrap(),
            "cohort_a bed"
        );
    }

    #[test]
    fn engine_failure_publishes_nothing() {
        let dir = tempdir().unwrap();
        let a = make_cohort(dir.path(), "cohort_a");
        let b = make_cohort(dir.path(), "cohort_b");
        let cfg = config(dir.path(), vec![a, b]);

        let engine = FnEngine(|req: &EngineRequest| {
            Err(PipelineError::EngineExecution {
                stage: req.stage,
                program: "plink".to_string(),
                detail: "disjoint marker sets".to_string(),
            })
        });

        let err = consolidate(&cfg, &engine).unwrap_err();
        assert!(matches!(err, PipelineError::MergeConflict { .. }));
        for ext in BED_EXTS {
            assert!(!prefix_with_ext(&cfg.merged_prefix(), ext).exists());
        }
    }

    #[test]
    fn missnp_sidecar_reports_conflict_count() {
        let dir = tempdir().unwrap();
        let a = make_cohort(dir.path(), "cohort_a");
        let b = make_cohort(dir.path(), "cohort_b");
        let cfg = config(dir.path(), vec![a, b]);

        let engine = FnEngine(|req: &EngineRequest| {
            let out = PathBuf::from(&req.args[req.args.len() - 1]);
            fs::write(format!("{}-merge.missnp", out.display()), "rs10\nrs20\n").unwrap();
            Err(PipelineError::EngineExecution {
                stage: req.stage,
                program: "plink".to_string(),
                detail: "exit status 3".to_string(),
            })
        });

        match consolidate(&cfg, &engine).unwrap_err() {
            PipelineError::MergeConflict { detail, .. } => {
                assert!(detail.contains("2 variant(s)"), "detail: {}", detail);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn single_cohort_is_copied_not_merged() {
        let dir = tempdir().unwrap();
        let a = make_cohort(dir.path(), "only");
        let cfg = config(dir.path(), vec![a]);

        let engine = FnEngine(|_: &EngineRequest| {
            panic!("engine must not run for a single cohort")
        });

        let merged = consolidate(&cfg, &engine).unwrap();
        assert_eq!(
            fs::read_to_string(prefix_with_ext(&merged, "bim")).unwrap(),
            "only bim"
        );
    }

    #[test]
    fn absent_cohort_member_is_missing_input() {
        let dir = tempdir().unwrap();
        let a = make_cohort(dir.path(), "cohort_a");
        let ghost = dir.path().join("ghost");
        let cfg = config(dir.path(), vec![a, ghost]);

        let engine = FnEngine(|_: &EngineRequest| Ok(()));
        let err = consolidate(&cfg, &engine).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }
}
