//! Error types for the docreport library.
//!
//! Every failure is fatal for the conversion it belongs to: callers get either
//! a complete, self-contained HTML artefact or a [`DocReportError`] naming the
//! missing resource or the failed stage. There is no partial output and no
//! retry.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docreport library.
#[derive(Debug, Error)]
pub enum DocReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A source document, template, image or temp notebook does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A template does not contain exactly one content substitution point.
    #[error("Template {} must contain exactly one content placeholder, found {found}", display_template(.path))]
    InvalidTemplate { path: Option<PathBuf>, found: usize },

    // ── Notebook errors ───────────────────────────────────────────────────
    /// The notebook file is not valid notebook JSON.
    #[error("Notebook '{path}' could not be parsed: {source}")]
    NotebookParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The notebook uses a different major format version than requested.
    #[error("Notebook '{path}' has nbformat {found}, expected {expected}")]
    UnsupportedNotebookVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// `metadata.kernelspec.name` is absent, so no kernel can be chosen.
    #[error("Notebook '{path}' does not declare a kernel (metadata.kernelspec.name)")]
    MissingKernelSpec { path: PathBuf },

    /// The external notebook tool could not be launched.
    #[error("Could not launch '{program}': {source}\nIs Jupyter installed and on PATH?")]
    ExecutorUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A code cell raised, timed out, or the executor exited with an error.
    #[error("Execution of '{path}' failed: {detail}")]
    ExecutionFailed { path: PathBuf, detail: String },

    /// The HTML exporter could not render the executed notebook.
    #[error("HTML export of '{path}' failed: {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The cleaned DOM could not be serialised back to HTML.
    #[error("HTML serialisation failed: {0}")]
    HtmlSerialization(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn display_template(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "<default>".to_string(),
    }
}

impl DocReportError {
    /// Map an I/O error on `path` to the matching variant.
    ///
    /// `NotFound` and `PermissionDenied` keep their own variants so callers can
    /// match on the missing resource; anything else is reported as internal.
    pub(crate) fn from_read(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Internal(format!("reading '{}': {}", path.display(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = DocReportError::FileNotFound {
            path: PathBuf::from("/docs/missing.md"),
        };
        assert!(e.to_string().contains("/docs/missing.md"));
    }

    #[test]
    fn invalid_template_display_default() {
        let e = DocReportError::InvalidTemplate {
            path: None,
            found: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("<default>"), "got: {msg}");
        assert!(msg.contains("found 2"), "got: {msg}");
    }

    #[test]
    fn version_mismatch_display() {
        let e = DocReportError::UnsupportedNotebookVersion {
            path: PathBuf::from("a.ipynb"),
            found: 3,
            expected: 4,
        };
        assert!(e.to_string().contains("nbformat 3"));
    }

    #[test]
    fn from_read_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            DocReportError::from_read("x.png", io),
            DocReportError::FileNotFound { .. }
        ));
    }

    #[test]
    fn from_read_maps_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            DocReportError::from_read("x.png", io),
            DocReportError::PermissionDenied { .. }
        ));
    }
}
