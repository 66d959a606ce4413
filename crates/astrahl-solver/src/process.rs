//! Backend that drives the solver executable through request files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::backend::SolverBackend;
use crate::batch::{pair_records, BatchDir, ALGORITHM_RECORD, PROPAGATE_RECORD, SPLITS_RECORD};
use crate::errors::SolverError;
use crate::request::{AlgorithmConfig, PropagateRequest, SplitsRequest, PROPAGATE, SPLITS};
use crate::response::{first_line, last_line};

/// Environment variable overriding the default scratch directory.
pub const SCRATCH_ENV: &str = "ASTRAHL_SCRATCH_DIR";

/// Diagnostic the solver prints for every unnamed expression node.
const BENIGN_WARNING: &str = "cJSON_to_exp: no \"name\" specified, using \"wire_index\"";

#[derive(Debug, Clone)]
pub struct ProcessSolverConfig {
    pub executable: PathBuf,
    /// Where request files go. Defaults to `$ASTRAHL_SCRATCH_DIR`, else
    /// `astrahl` under the system temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// Remove request files once the call returns.
    pub cleanup: bool,
}

impl Default for ProcessSolverConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("src/main"),
            scratch_dir: None,
            cleanup: true,
        }
    }
}

/// Process-wide default scratch directory, shared by every backend that
/// does not name its own.
static DEFAULT_SCRATCH: OnceLock<PathBuf> = OnceLock::new();

fn default_scratch_dir() -> Result<&'static Path, SolverError> {
    if let Some(dir) = DEFAULT_SCRATCH.get() {
        return Ok(dir);
    }
    let dir = std::env::var_os(SCRATCH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("astrahl"));
    std::fs::create_dir_all(&dir)?;
    Ok(DEFAULT_SCRATCH.get_or_init(|| dir))
}

/// Request file kept alive for the duration of one call.
enum ScratchFile {
    Temporary(NamedTempFile),
    Kept(PathBuf),
}

impl ScratchFile {
    fn path(&self) -> &Path {
        match self {
            ScratchFile::Temporary(file) => file.path(),
            ScratchFile::Kept(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessSolver {
    config: ProcessSolverConfig,
    scratch: OnceLock<PathBuf>,
}

impl ProcessSolver {
    pub fn new(config: ProcessSolverConfig) -> Self {
        Self {
            config,
            scratch: OnceLock::new(),
        }
    }

    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self::new(ProcessSolverConfig {
            executable: executable.into(),
            ..ProcessSolverConfig::default()
        })
    }

    pub fn config(&self) -> &ProcessSolverConfig {
        &self.config
    }

    /// Scratch directory, created on first use. It is never removed.
    ///
    /// Without a configured directory this is the process-wide default,
    /// created once for all backends.
    pub fn scratch_dir(&self) -> Result<&Path, SolverError> {
        let Some(configured) = &self.config.scratch_dir else {
            return default_scratch_dir();
        };
        if let Some(dir) = self.scratch.get() {
            return Ok(dir);
        }
        std::fs::create_dir_all(configured)?;
        Ok(self.scratch.get_or_init(|| configured.clone()))
    }

    fn write_request<T: Serialize>(&self, doc: &T, tag: &str) -> Result<ScratchFile, SolverError> {
        let mut file = tempfile::Builder::new()
            .prefix("astrahl_")
            .suffix(&format!("_{tag}.json"))
            .tempfile_in(self.scratch_dir()?)?;
        serde_json::to_writer_pretty(file.as_file_mut(), doc)?;
        file.as_file_mut().flush()?;
        if self.config.cleanup {
            return Ok(ScratchFile::Temporary(file));
        }
        let (_, path) = file.keep().map_err(|e| SolverError::Io(e.error))?;
        debug!(path = %path.display(), "keeping request file");
        Ok(ScratchFile::Kept(path))
    }

    /// Run `<executable> <mode> -f <request> [-o <algorithm>]` and return
    /// its standard output.
    pub fn invoke(
        &self,
        mode: &str,
        request: &Path,
        algorithm: Option<&Path>,
    ) -> Result<String, SolverError> {
        if request.as_os_str().is_empty() {
            return Err(SolverError::MissingRequestFile);
        }
        let executable = self.config.executable.display().to_string();
        let mut command = Command::new(&self.config.executable);
        command.arg(mode).arg("-f").arg(request);
        if let Some(algorithm) = algorithm {
            command.arg("-o").arg(algorithm);
        }
        debug!(%executable, mode, request = %request.display(), "invoking solver");

        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SolverError::Spawn {
                executable: executable.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).replace(BENIGN_WARNING, "");
        let stderr = stderr.trim();
        if !output.status.success() {
            return Err(SolverError::SolverFailed {
                executable,
                status: output.status.to_string(),
                stderr: stderr.to_string(),
            });
        }
        if !stderr.is_empty() {
            warn!(mode, "solver reported: {stderr}");
        }
        String::from_utf8(output.stdout).map_err(|_| {
            SolverError::MalformedResponse("solver output is not valid UTF-8".to_string())
        })
    }
}

impl SolverBackend for ProcessSolver {
    fn splits(
        &self,
        request: &SplitsRequest,
        algorithm: &AlgorithmConfig,
    ) -> Result<String, SolverError> {
        let request_file = self.write_request(request, SPLITS)?;
        let algorithm_file = self.write_request(algorithm, ALGORITHM_RECORD)?;
        self.invoke(SPLITS, request_file.path(), Some(algorithm_file.path()))
    }

    fn propagate(&self, request: &PropagateRequest) -> Result<String, SolverError> {
        let request_file = self.write_request(request, PROPAGATE)?;
        self.invoke(PROPAGATE, request_file.path(), None)
    }

    fn splits_bulk(
        &self,
        requests: &[(SplitsRequest, AlgorithmConfig)],
    ) -> Result<Vec<String>, SolverError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let batch = BatchDir::create_in(self.scratch_dir()?)?;
        let (splits, algorithms): (Vec<_>, Vec<_>) =
            requests.iter().map(|(s, a)| (s, a)).unzip();
        batch.write_records(SPLITS_RECORD, &splits)?;
        batch.write_records(ALGORITHM_RECORD, &algorithms)?;
        let pairs = pair_records(
            &batch.records(SPLITS_RECORD)?,
            &batch.records(ALGORITHM_RECORD)?,
        )?;
        pairs
            .iter()
            .map(|(split, algorithm)| {
                let output = self.invoke(SPLITS, split, Some(algorithm))?;
                Ok(last_line(&output).unwrap_or_default().to_string())
            })
            .collect()
    }

    fn propagate_bulk(&self, requests: &[PropagateRequest]) -> Result<Vec<String>, SolverError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let batch = BatchDir::create_in(self.scratch_dir()?)?;
        batch.write_records(PROPAGATE_RECORD, requests)?;
        batch
            .records(PROPAGATE_RECORD)?
            .iter()
            .map(|record| {
                let output = self.invoke(PROPAGATE, record, None)?;
                Ok(first_line(&output).unwrap_or_default().to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_path_is_rejected() {
        let solver = ProcessSolver::with_executable("/nonexistent/solver");
        assert!(matches!(
            solver.invoke(PROPAGATE, Path::new(""), None),
            Err(SolverError::MissingRequestFile)
        ));
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let scratch = tempfile::tempdir().unwrap();
        let solver = ProcessSolver::new(ProcessSolverConfig {
            executable: PathBuf::from("/nonexistent/solver"),
            scratch_dir: Some(scratch.path().to_path_buf()),
            cleanup: true,
        });
        let request = PropagateRequest {
            ft: serde_json::json!({"type": "wire", "index": 0, "name": "a"}),
            point: vec![],
        };
        assert!(matches!(
            solver.propagate(&request),
            Err(SolverError::Spawn { .. })
        ));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn default_scratch_dir_is_shared_across_backends() {
        let first = ProcessSolver::with_executable("/nonexistent/solver");
        let second = ProcessSolver::with_executable("/nonexistent/other");
        let a = first.scratch_dir().unwrap();
        let b = second.scratch_dir().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(a.is_dir());
    }

    #[test]
    fn scratch_dir_is_created_once() {
        let parent = tempfile::tempdir().unwrap();
        let dir = parent.path().join("nested").join("scratch");
        let solver = ProcessSolver::new(ProcessSolverConfig {
            scratch_dir: Some(dir.clone()),
            ..ProcessSolverConfig::default()
        });
        assert_eq!(solver.scratch_dir().unwrap(), dir.as_path());
        assert!(dir.is_dir());
        assert_eq!(solver.scratch_dir().unwrap(), dir.as_path());
    }
}
