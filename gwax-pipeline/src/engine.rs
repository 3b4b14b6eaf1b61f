//! Boundary to the external genotype engines (merge and association test).
//!
//! The pipeline never interprets what an engine computes; it only builds an
//! argument list, waits for the process, and checks the exit status.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use gwax_core::PipelineError;

/// One blocking engine invocation. stdout/stderr are redirected to
/// `log_path` so failures can be diagnosed after the fact.
#[derive(Clone, Debug)]
pub struct EngineRequest {
    pub stage: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub log_path: PathBuf,
}

impl EngineRequest {
    pub fn new(stage: &'static str, program: &Path, log_path: PathBuf) -> Self {
        EngineRequest {
            stage,
            program: program.to_path_buf(),
            args: Vec::new(),
            log_path,
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// Capability to run an engine invocation to completion.
pub trait Engine {
    fn run(&self, request: &EngineRequest) -> Result<(), PipelineError>;
}

/// Real implementation: synchronous child process with an optional timeout.
/// Expiry kills the child and surfaces as `EngineExecution`; there is no
/// retry (engine runs are expensive and not safely re-runnable in part).
pub struct ProcessEngine {
    pub timeout: Option<Duration>,
}

impl ProcessEngine {
    pub fn new(timeout: Option<Duration>) -> Self {
        ProcessEngine { timeout }
    }
}

impl Engine for ProcessEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), PipelineError> {
        let log = File::create(&request.log_path)
            .map_err(|e| engine_error(request, format!("cannot create log file: {}", e)))?;
        let log_err = log
            .try_clone()
            .map_err(|e| engine_error(request, format!("cannot clone log handle: {}", e)))?;

        let mut child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()
            .map_err(|e| engine_error(request, format!("failed to start: {}", e)))?;

        let status = match self.timeout {
            None => child
                .wait()
                .map_err(|e| engine_error(request, format!("wait failed: {}", e)))?,
            Some(limit) => wait_with_timeout(&mut child, limit, request)?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(engine_error(
                request,
                format!(
                    "exit status {}; last output: {}",
                    status,
                    log_tail(&request.log_path)
                ),
            ))
        }
    }
}

fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    request: &EngineRequest,
) -> Result<ExitStatus, PipelineError> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => return Err(engine_error(request, format!("wait failed: {}", e))),
        }
        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Err(engine_error(
                request,
                format!("timed out after {:.1}s", limit.as_secs_f64()),
            ));
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

fn engine_error(request: &EngineRequest, detail: String) -> PipelineError {
    PipelineError::EngineExecution {
        stage: request.stage,
        program: request.program.display().to_string(),
        detail,
    }
}

/// Last few log lines, for inlining into an error message.
fn log_tail(path: &Path) -> String {
    let Ok(file) = File::open(path) else {
        return format!("(no log at {})", path.display());
    };
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .collect();
    let tail: Vec<&str> = lines
        .iter()
        .rev()
        .take(5)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if tail.is_empty() {
        format!("(empty log at {})", path.display())
    } else {
        tail.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(dir: &Path, program: &str, args: &[&str]) -> EngineRequest {
        let mut req = EngineRequest::new("test stage", Path::new(program), dir.join("engine.log"));
        for a in args {
            req = req.arg(*a);
        }
        req
    }

    #[test]
    fn successful_process_runs_clean() {
        let dir = tempdir().unwrap();
        let engine = ProcessEngine::new(None);
        engine.run(&request(dir.path(), "true", &[])).unwrap();
    }

    #[test]
    fn nonzero_exit_is_engine_execution() {
        let dir = tempdir().unwrap();
        let engine = ProcessEngine::new(None);
        let err = engine
            .run(&request(dir.path(), "sh", &["-c", "echo boom >&2; exit 3"]))
            .unwrap_err();
        match err {
            PipelineError::EngineExecution { stage, detail, .. } => {
                assert_eq!(stage, "test stage");
                assert!(detail.contains("boom"), "detail: {}", detail);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_engine_execution() {
        let dir = tempdir().unwrap();
        let engine = ProcessEngine::new(None);
        let err = engine
            .run(&request(dir.path(), "/no/such/engine", &[]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::EngineExecution { .. }));
    }

    #[test]
    fn timeout_kills_and_reports() {
        let dir = tempdir().unwrap();
        let engine = ProcessEngine::new(Some(Duration::from_millis(200)));
        let err = engine
            .run(&request(dir.path(), "sleep", &["5"]))
            .unwrap_err();
        match err {
            PipelineError::EngineExecution { detail, .. } => {
                assert!(detail.contains("timed out"), "detail: {}", detail);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
