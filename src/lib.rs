//! # docreport
//!
//! Turn Markdown files and Jupyter notebooks into self-contained HTML.
//!
//! ## Pipelines
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Read      source file (UTF-8)
//!  ├─ 2. Render    comrak, raw HTML passed through
//!  ├─ 3. Template  inject into a shell with one {{content}} tag
//!  └─ 4. Inline    every local <img src> becomes a base64 data URI
//!
//! Notebook
//!  │
//!  ├─ 1. Execute   run all cells on the declared kernel (jupyter nbconvert)
//!  ├─ 2. Export    render the executed notebook to HTML, drop the temp copy
//!  └─ 3. Clean     remove prompts, unwrap layout wrappers, normalise
//!                  tables and code blocks
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docreport::{convert_markdown, generate_report, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = convert_markdown("docs/guide.md", None).await?;
//!     std::fs::write("docs/guide.html", html)?;
//!
//!     let config = ReportConfig::builder().timeout_secs(600).build()?;
//!     let output = generate_report("analysis/sales.ipynb", "reports", &config).await?;
//!     eprintln!("{} in {}ms", output.report_path.display(), output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docreport` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docreport = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! Notebook execution, and export with the default exporter, shell out to
//! `jupyter nbconvert`. [`ExporterKind::Builtin`] renders HTML in-process, and
//! both collaborators can be replaced through [`ReportConfigBuilder`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod notebook;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReportConfig, ReportConfigBuilder};
pub use document::{convert_markdown, convert_markdown_sync, convert_markdown_to_file};
pub use error::DocReportError;
pub use notebook::execute::{ExecutionRequest, JupyterExecutor, NotebookExecutor};
pub use notebook::export::{BuiltinExporter, ExportRequest, ExporterKind, HtmlExporter, NbconvertExporter};
pub use notebook::Notebook;
pub use output::{ReportOutput, ReportStats};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback, ReportStage};
pub use report::{generate_report, generate_report_sync, NotebookReport, ReportState};
