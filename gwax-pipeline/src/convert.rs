//! Dataset format adapter: re-encodes the merged dataset into the encoding
//! the association engine consumes (bed → pgen). Pure translation; no row or
//! column semantics change, and identical input yields identical output.

use std::io;
use std::path::{Path, PathBuf};

use gwax_core::{PipelineError, RunConfig};

use crate::engine::{Engine, EngineRequest};
use crate::prefix_with_ext;

const PGEN_EXTS: [&str; 3] = ["pgen", "pvar", "psam"];
const STAGE_NAME: &str = "format adaption";

/// Convert the merged fileset at `merged_prefix` to the engine-native
/// encoding under the configured unified prefix.
pub fn adapt_dataset(
    cfg: &RunConfig,
    engine: &dyn Engine,
    merged_prefix: &Path,
) -> Result<PathBuf, PipelineError> {
    let bed = prefix_with_ext(merged_prefix, "bed");
    if !bed.exists() {
        return Err(PipelineError::missing_input(
            &bed,
            io::Error::new(io::ErrorKind::NotFound, "merged dataset not found"),
        ));
    }

    let unified = cfg.unified_prefix();
    let request = EngineRequest::new(
        STAGE_NAME,
        &cfg.assoc_engine,
        cfg.output_dir.join("convert_engine.log"),
    )
    .arg("--bfile")
    .arg(merged_prefix.display().to_string())
    .arg("--make-pgen")
    .arg("--out")
    .arg(unified.display().to_string());

    engine.run(&request).map_err(|err| match err {
        PipelineError::EngineExecution { detail, .. } => PipelineError::FormatConversion {
            path: bed.clone(),
            detail,
        },
        other => other,
    })?;

    for ext in PGEN_EXTS {
        let out = prefix_with_ext(&unified, ext);
        if !out.exists() {
            return Err(PipelineError::FormatConversion {
                path: out,
                detail: "adapter completed but output member is missing".to_string(),
            });
        }
    }
    Ok(unified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FnEngine;
    use std::fs;
    use tempfile::tempdir;

    fn config(dir: &Path) -> RunConfig {
        let cfg = RunConfig::new(
            dir.join("pheno.txt"),
            vec![dir.join("cohort_a")],
            dir.join("candidates.csv"),
            dir.join("out"),
        );
        fs::create_dir_all(&cfg.output_dir).unwrap();
        cfg
    }

    fn make_merged(dir: &Path) -> PathBuf {
        let prefix = dir.join("merged_all_bed");
        for ext in ["bed", "bim", "fam"] {
            fs::write(prefix_with_ext(&prefix, ext), ext).unwrap();
        }
        prefix
    }

    #[test]
    fn builds_expected_arguments_and_checks_output() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        let merged = make_merged(&cfg.output_dir);

        let engine = FnEngine(|req: &EngineRequest| {
            assert_eq!(req.args[0], "--bfile");
            assert_eq!(req.args[2], "--make-pgen");
            let out = PathBuf::from(&req.args[4]);
            for ext in PGEN_EXTS {
                fs::write(prefix_with_ext(&out, ext), "converted").unwrap();
            }
            Ok(())
        });

        let unified = adapt_dataset(&cfg, &engine, &merged).unwrap();
        assert!(prefix_with_ext(&unified, "pgen").exists());
    }

    #[test]
    fn engine_failure_maps_to_format_conversion() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        let merged = make_merged(&cfg.output_dir);

        let engine = FnEngine(|req: &EngineRequest| {
            Err(PipelineError::EngineExecution {
                stage: req.stage,
                program: "plink2".to_string(),
                detail: "malformed bed magic".to_string(),
            })
        });

        let err = adapt_dataset(&cfg, &engine, &merged).unwrap_err();
        assert!(matches!(err, PipelineError::FormatConversion { .. }));
    }

    #[test]
    fn absent_merged_input_is_missing_input() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        let engine = FnEngine(|_: &EngineRequest| Ok(()));
        let err = adapt_dataset(&cfg, &engine, &dir.path().join("nothing")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }
}
