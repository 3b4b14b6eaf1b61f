//! gwax-pipeline: the data-integration stages of the gwax toolkit.
//!
//! Stages run strictly sequentially: phenotype join, cohort consolidation,
//! format adaption, association run. External engine invocations go through
//! the [`engine::Engine`] boundary so the stages can be tested with canned
//! substitutes.

pub mod assoc;
pub mod convert;
pub mod engine;
pub mod merge;
pub mod pheno;

use std::path::{Path, PathBuf};

/// Append an extension to a fileset prefix without clobbering dots in the
/// prefix itself (`Path::with_extension` would).
pub(crate) fn prefix_with_ext(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::engine::{Engine, EngineRequest};
    use gwax_core::PipelineError;

    /// Engine substitute backed by a closure; lets stage tests return canned
    /// outcomes or fabricate output files without spawning a process.
    pub struct FnEngine<F>(pub F)
    where
        F: Fn(&EngineRequest) -> Result<(), PipelineError>;

    impl<F> Engine for FnEngine<F>
    where
        F: Fn(&EngineRequest) -> Result<(), PipelineError>,
    {
        fn run(&self, request: &EngineRequest) -> Result<(), PipelineError> {
            (self.0)(request)
        }
    }
}
