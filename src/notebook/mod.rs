//! Notebook documents: the nbformat v4 JSON model plus its execution and
//! export stages.
//!
//! The model is deliberately loose: only the fields this crate reads are
//! typed, and everything else is captured in `extra` maps so that a notebook
//! read and written back keeps widget state, cell ids and tool metadata.
//!
//! ```text
//! read_notebook ──▶ execute::NotebookExecutor ──▶ write_notebook (temp)
//!                                                     │
//!        report ◀── export::HtmlExporter ◀── read_notebook (temp)
//! ```

pub mod execute;
pub mod export;

use crate::error::DocReportError;
use crate::pipeline::input;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Notebook format major version read by default.
pub const DEFAULT_NBFORMAT: u32 = 4;

/// A notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Top-level notebook metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_info: Option<LanguageInfo>,
    /// Report title override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// nbformat stores long strings either whole or as a list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Single(String),
    Lines(Vec<String>),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Single(String::new())
    }
}

impl MultilineText {
    /// The full text; list form is concatenated (lines keep their `\n`).
    pub fn text(&self) -> String {
        match self {
            MultilineText::Single(s) => s.clone(),
            MultilineText::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown(TextCell),
    Code(CodeCell),
    Raw(TextCell),
}

/// A markdown or raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    #[serde(default)]
    pub source: MultilineText,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default)]
    pub source: MultilineText,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub execution_count: Option<u32>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A code cell output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: String,
        text: MultilineText,
    },
    DisplayData {
        #[serde(default)]
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        #[serde(default)]
        execution_count: Option<u32>,
        #[serde(default)]
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// Text of a MIME bundle entry, joining list-form values.
pub fn mime_text(data: &Map<String, Value>, mime: &str) -> Option<String> {
    match data.get(mime)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(items.iter().filter_map(Value::as_str).collect()),
        other => Some(other.to_string()),
    }
}

impl Notebook {
    /// Kernel declared in `metadata.kernelspec.name`.
    pub fn kernel_name(&self) -> Option<&str> {
        self.metadata
            .kernelspec
            .as_ref()
            .map(|k| k.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Language used for syntax classes, falling back to the kernel name.
    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .map(|l| l.name.as_str())
            .or_else(|| self.kernel_name())
            .unwrap_or("text")
    }

    /// Parse notebook JSON, checking the major format version.
    pub fn from_json(json: &str, path: &Path, as_version: u32) -> Result<Self, DocReportError> {
        let notebook: Notebook =
            serde_json::from_str(json).map_err(|source| DocReportError::NotebookParse {
                path: path.to_path_buf(),
                source,
            })?;

        if notebook.nbformat != as_version {
            return Err(DocReportError::UnsupportedNotebookVersion {
                path: path.to_path_buf(),
                found: notebook.nbformat,
                expected: as_version,
            });
        }
        Ok(notebook)
    }

    /// Serialise in nbformat's on-disk layout (one-space indent, trailing newline).
    pub fn to_json(&self) -> Result<String, DocReportError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| DocReportError::Internal(format!("notebook serialisation: {}", e)))?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| DocReportError::Internal(e.to_string()))
    }
}

/// Read a notebook from disk.
pub async fn read_notebook(path: &Path, as_version: u32) -> Result<Notebook, DocReportError> {
    let json = input::read_text(path).await?;
    let notebook = Notebook::from_json(&json, path, as_version)?;
    debug!(
        "Read notebook {} ({} cells)",
        path.display(),
        notebook.cells.len()
    );
    Ok(notebook)
}

/// Write a notebook to disk.
pub async fn write_notebook(notebook: &Notebook, path: &Path) -> Result<(), DocReportError> {
    input::write_atomic(path, notebook.to_json()?).await
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Notebook {
        Notebook::from_json(fixtures::SAMPLE, Path::new("sample.ipynb"), 4).unwrap()
    }

    #[test]
    fn parses_cells_and_kernel() {
        let nb = sample();
        assert_eq!(nb.kernel_name(), Some("python3"));
        assert_eq!(nb.language(), "python");
        assert_eq!(nb.cells.len(), 4);
        match &nb.cells[0] {
            Cell::Markdown(c) => assert_eq!(c.source.text(), "# Sales report\n\nQuarterly *numbers*."),
            other => panic!("expected markdown cell, got {other:?}"),
        }
        match &nb.cells[1] {
            Cell::Code(c) => {
                assert_eq!(c.execution_count, Some(1));
                assert_eq!(c.outputs.len(), 2);
            }
            other => panic!("expected code cell, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let nb = sample();
        let json = nb.to_json().unwrap();
        let back = Notebook::from_json(&json, Path::new("sample.ipynb"), 4).unwrap();
        assert_eq!(nb, back);
        assert!(json.contains("\"widgets\""));
        assert!(json.contains("\"id\": \"intro\""));
        assert!(json.starts_with("{\n \""), "one-space indent expected");
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let err = Notebook::from_json(fixtures::SAMPLE, Path::new("s.ipynb"), 3).unwrap_err();
        assert!(matches!(
            err,
            DocReportError::UnsupportedNotebookVersion {
                found: 4,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = Notebook::from_json("{not json", Path::new("bad.ipynb"), 4).unwrap_err();
        match err {
            DocReportError::NotebookParse { path, .. } => assert_eq!(path, PathBuf::from("bad.ipynb")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_kernelspec_yields_none() {
        let nb = Notebook::from_json(
            r#"{"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": []}"#,
            Path::new("k.ipynb"),
            4,
        )
        .unwrap();
        assert_eq!(nb.kernel_name(), None);
        assert_eq!(nb.language(), "text");
    }

    #[test]
    fn mime_text_joins_lists() {
        let nb = sample();
        let Cell::Code(cell) = &nb.cells[1] else {
            panic!("expected code cell");
        };
        let Output::ExecuteResult { data, .. } = &cell.outputs[1] else {
            panic!("expected execute_result");
        };
        assert_eq!(
            mime_text(data, "text/html").unwrap(),
            "<table class=\"dataframe\" border=\"1\"><tr><td>1</td></tr></table>"
        );
        assert_eq!(mime_text(data, "image/png"), None);
    }

    #[tokio::test]
    async fn read_missing_notebook_is_not_found() {
        let err = read_notebook(Path::new("/nope/missing.ipynb"), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, DocReportError::FileNotFound { .. }));
    }
}
