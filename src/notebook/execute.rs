//! Notebook execution: run every code cell against the notebook's kernel.
//!
//! Execution is delegated to an external engine behind the
//! [`NotebookExecutor`] trait. The default, [`JupyterExecutor`], shells out to
//! `jupyter nbconvert --execute`, which talks to the kernel and enforces the
//! per-cell timeout. Implementations are blocking; the report pipeline calls
//! them from `spawn_blocking`.

use crate::error::DocReportError;
use crate::notebook::{Notebook, DEFAULT_NBFORMAT};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Everything an executor needs to run one notebook.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Notebook on disk, as given by the caller.
    pub notebook_path: PathBuf,
    /// The parsed notebook.
    pub notebook: Notebook,
    /// Kernel from `metadata.kernelspec.name`.
    pub kernel_name: String,
    /// Per-cell timeout in seconds.
    pub timeout_secs: u64,
    /// Directory cells run in (the notebook's own folder).
    pub working_dir: PathBuf,
}

/// Runs a notebook's code cells and returns the notebook with outputs filled in.
///
/// Any cell error must surface as [`DocReportError::ExecutionFailed`].
pub trait NotebookExecutor: Send + Sync {
    fn execute(&self, request: &ExecutionRequest) -> Result<Notebook, DocReportError>;
}

/// Executes notebooks with `jupyter nbconvert --to notebook --execute`.
#[derive(Debug, Clone)]
pub struct JupyterExecutor {
    program: String,
}

impl Default for JupyterExecutor {
    fn default() -> Self {
        Self::new("jupyter")
    }
}

impl JupyterExecutor {
    /// Use `program` (a path or a name on `PATH`) instead of `jupyter`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Both paths are made absolute: the child runs inside `working_dir`, so
    /// a relative notebook path would otherwise be resolved twice.
    fn command(&self, request: &ExecutionRequest) -> Result<Command, DocReportError> {
        let notebook = absolute(&request.notebook_path)?;
        let working_dir = absolute(&request.working_dir)?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("nbconvert")
            .args(["--to", "notebook", "--execute", "--stdout"])
            .arg(format!(
                "--ExecutePreprocessor.timeout={}",
                request.timeout_secs
            ))
            .arg(format!(
                "--ExecutePreprocessor.kernel_name={}",
                request.kernel_name
            ))
            .arg(notebook)
            .current_dir(working_dir);
        Ok(cmd)
    }
}

/// `path` made absolute against the process working directory; an empty
/// path means the working directory itself.
fn absolute(path: &Path) -> Result<PathBuf, DocReportError> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    std::path::absolute(path).map_err(|e| {
        DocReportError::Internal(format!("resolving '{}': {}", path.display(), e))
    })
}

impl NotebookExecutor for JupyterExecutor {
    fn execute(&self, request: &ExecutionRequest) -> Result<Notebook, DocReportError> {
        info!(
            "Executing {} with kernel '{}' (timeout {}s per cell)",
            request.notebook_path.display(),
            request.kernel_name,
            request.timeout_secs
        );

        let output = self.command(request)?.output().map_err(|source| {
            DocReportError::ExecutorUnavailable {
                program: self.program.clone(),
                source,
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocReportError::ExecutionFailed {
                path: request.notebook_path.clone(),
                detail: format!("{} (exit {})", tail(&stderr, 20), output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Executor produced {} bytes", stdout.len());
        Notebook::from_json(&stdout, &request.notebook_path, DEFAULT_NBFORMAT)
    }
}

/// Last `n` non-empty lines of a tool's stderr, where the traceback ends.
pub(crate) fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::fixtures;

    fn request() -> ExecutionRequest {
        ExecutionRequest {
            notebook_path: PathBuf::from("/work/sales.ipynb"),
            notebook: Notebook::from_json(fixtures::SAMPLE, Path::new("sales.ipynb"), 4).unwrap(),
            kernel_name: "python3".into(),
            timeout_secs: 600,
            working_dir: PathBuf::from("/work"),
        }
    }

    #[test]
    fn command_passes_kernel_and_timeout() {
        let cmd = JupyterExecutor::default().command(&request()).unwrap();
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "jupyter");
        assert!(args.contains(&"--ExecutePreprocessor.timeout=600".to_string()));
        assert!(args.contains(&"--ExecutePreprocessor.kernel_name=python3".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/work/sales.ipynb"));
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/work")));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let executor = JupyterExecutor::new("docreport-no-such-jupyter");
        let mut req = request();
        req.working_dir = std::env::temp_dir();
        let err = executor.execute(&req).unwrap_err();
        assert!(
            matches!(err, DocReportError::ExecutorUnavailable { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn relative_notebook_path_is_made_absolute() {
        let mut req = request();
        req.notebook_path = PathBuf::from("analysis/sales.ipynb");
        req.working_dir = PathBuf::from("analysis");

        let cmd = JupyterExecutor::default().command(&req).unwrap();
        let cwd = std::env::current_dir().unwrap();
        let last = cmd.get_args().last().map(PathBuf::from);
        assert_eq!(last, Some(cwd.join("analysis/sales.ipynb")));
        assert_eq!(cmd.get_current_dir(), Some(cwd.join("analysis").as_path()));
    }

    #[test]
    fn empty_working_dir_means_current_dir() {
        let mut req = request();
        req.notebook_path = PathBuf::from("sales.ipynb");
        req.working_dir = PathBuf::new();

        let cmd = JupyterExecutor::default().command(&req).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(cmd.get_current_dir(), Some(cwd.as_path()));
    }

    /// Stand-in `jupyter` that prints the notebook named by its last argument,
    /// failing if that path does not resolve from its working directory.
    #[cfg(unix)]
    fn echo_jupyter(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-jupyter");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\n[ -f \"$last\" ] || { echo \"missing $last\" >&2; exit 1; }\ncat \"$last\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::path::absolute(&script).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn executes_notebook_given_by_relative_path() {
        // A folder under the current directory, addressed relatively.
        let dir = tempfile::Builder::new()
            .prefix("nbexec-")
            .tempdir_in(".")
            .unwrap();
        let folder = PathBuf::from(dir.path().file_name().unwrap());
        let notebook_path = folder.join("sales.ipynb");
        std::fs::write(&notebook_path, fixtures::SAMPLE).unwrap();
        assert!(notebook_path.is_relative());

        let executor = JupyterExecutor::new(echo_jupyter(dir.path()).to_string_lossy());
        let req = ExecutionRequest {
            notebook_path: notebook_path.clone(),
            notebook: Notebook::from_json(fixtures::SAMPLE, &notebook_path, 4).unwrap(),
            kernel_name: "python3".into(),
            timeout_secs: 60,
            working_dir: folder,
        };

        let executed = executor.execute(&req).unwrap();
        assert_eq!(executed.cells.len(), 4);
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\n\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
    }
}
