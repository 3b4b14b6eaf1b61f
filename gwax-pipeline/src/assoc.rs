//! Association runner: invokes the external association-testing engine over
//! the unified dataset and locates the per-variant statistics table it wrote.
//!
//! The runner passes parameters through and checks outputs; the statistical
//! model itself is entirely the engine's business.

use std::fs;
use std::path::{Path, PathBuf};

use gwax_core::{PipelineError, RunConfig};

use crate::engine::{Engine, EngineRequest};
use crate::pheno::verify_phenotype_column;
use crate::prefix_with_ext;

const STAGE_NAME: &str = "association test";

/// Run the association test and return the path of the association table.
pub fn run_association(
    cfg: &RunConfig,
    engine: &dyn Engine,
    unified_prefix: &Path,
) -> Result<PathBuf, PipelineError> {
    verify_phenotype_column(&cfg.phenotype_file, &cfg.phenotype_column)?;

    let out_prefix = cfg.assoc_prefix();
    let request = EngineRequest::new(
        STAGE_NAME,
        &cfg.assoc_engine,
        cfg.output_dir.join("assoc_engine.log"),
    )
    .arg("--pfile")
    .arg(unified_prefix.display().to_string())
    .arg("--pheno")
    .arg(cfg.phenotype_file.display().to_string())
    .arg("--pheno-name")
    .arg(cfg.phenotype_column.clone())
    .arg("--glm")
    .arg("allow-no-covars")
    .arg("--out")
    .arg(out_prefix.display().to_string());

    engine.run(&request)?;
    locate_assoc_table(&cfg.assoc_engine, &out_prefix)
}

/// The engine names its output by convention: either `<prefix>.assoc` or
/// `<prefix>.<pheno>.glm.<model>`. Scan for the first that exists;
/// candidates are sorted for determinism.
fn locate_assoc_table(program: &Path, out_prefix: &Path) -> Result<PathBuf, PipelineError> {
    let direct = prefix_with_ext(out_prefix, "assoc");
    if direct.exists() {
        return Ok(direct);
    }

    let dir = out_prefix.parent().unwrap_or_else(|| Path::new("."));
    let stem = out_prefix
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let entries = fs::read_dir(dir).map_err(|e| PipelineError::missing_input(dir, e))?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| {
                    let name = n.to_string_lossy();
                    name.starts_with(&stem) && name.contains(".glm.") && !name.ends_with(".log")
                })
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::EngineExecution {
            stage: STAGE_NAME,
            program: program.display().to_string(),
            detail: format!(
                "engine completed but wrote no association table under {}",
                out_prefix.display()
            ),
        })
}

/// Convenience for reruns against an existing association table: verify the
/// file is readable before handing it to the cross-referencer.
pub fn verify_assoc_table(path: &Path) -> Result<(), PipelineError> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| PipelineError::missing_input(path, e))
}
