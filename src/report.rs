//! Notebook → cleaned HTML report.
//!
//! ```text
//! notebook.ipynb ──execute──▶ <temp_dir>/notebook.ipynb
//!                ──export───▶ <report_folder>/notebook.html   (temp removed)
//!                ──clean────▶ <report_folder>/notebook.html   (rewritten)
//! ```
//!
//! Each stage is a separate async method on [`NotebookReport`] so callers can
//! stop after any of them. [`NotebookReport::generate`] runs all three and
//! reports progress through the configured callback.

use crate::config::ReportConfig;
use crate::error::DocReportError;
use crate::notebook::execute::ExecutionRequest;
use crate::notebook::export::ExportRequest;
use crate::notebook::{read_notebook, write_notebook, Notebook};
use crate::output::{ReportOutput, ReportStats};
use crate::pipeline::{cleanup, input};
use crate::progress::{NoopProgressCallback, ProgressCallback, ReportStage};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How far a [`NotebookReport`] has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportState {
    Unexecuted,
    Executed,
    Exported,
    Cleaned,
}

/// One notebook and the files derived from it.
#[derive(Debug)]
pub struct NotebookReport {
    notebook_path: PathBuf,
    notebook_folder: PathBuf,
    temporary_notebook: PathBuf,
    report_path: PathBuf,
    default_title: String,
    config: ReportConfig,
    state: ReportState,
    cells: usize,
}

impl NotebookReport {
    /// Derive all paths for `notebook_path`; nothing is touched on disk.
    pub fn new(
        notebook_path: impl Into<PathBuf>,
        report_folder: impl AsRef<Path>,
        config: ReportConfig,
    ) -> Self {
        let notebook_path = notebook_path.into();
        let notebook_folder = notebook_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = notebook_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        let temporary_notebook = config.temp_dir.join(&file_name);
        let report_path = report_folder
            .as_ref()
            .join(&file_name)
            .with_extension("html");
        let default_title = title_from_path(&notebook_path);

        Self {
            notebook_path,
            notebook_folder,
            temporary_notebook,
            report_path,
            default_title,
            config,
            state: ReportState::Unexecuted,
            cells: 0,
        }
    }

    pub fn state(&self) -> ReportState {
        self.state
    }

    pub fn notebook_path(&self) -> &Path {
        &self.notebook_path
    }

    /// Where the executed notebook is parked between execute and export.
    pub fn temporary_notebook(&self) -> &Path {
        &self.temporary_notebook
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Title used when the notebook metadata carries none.
    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    /// Run every code cell and write the executed notebook to the temp path.
    ///
    /// Returns the kernel the notebook ran on.
    pub async fn execute_notebook(&mut self) -> Result<String, DocReportError> {
        let notebook = read_notebook(&self.notebook_path, self.config.notebook_version).await?;
        let kernel_name = notebook
            .kernel_name()
            .ok_or_else(|| DocReportError::MissingKernelSpec {
                path: self.notebook_path.clone(),
            })?
            .to_string();

        info!(
            "Executing {} with kernel '{}' (timeout {}s per cell)",
            self.notebook_path.display(),
            kernel_name,
            self.config.timeout_secs
        );

        let request = ExecutionRequest {
            notebook_path: self.notebook_path.clone(),
            notebook,
            kernel_name: kernel_name.clone(),
            timeout_secs: self.config.timeout_secs,
            working_dir: self.notebook_folder.clone(),
        };
        let executor = self.config.resolve_executor();
        let executed = tokio::task::spawn_blocking(move || executor.execute(&request))
            .await
            .map_err(|e| DocReportError::Internal(format!("Execution task panicked: {}", e)))??;

        self.cells = executed.cells.len();
        write_notebook(&executed, &self.temporary_notebook).await?;
        debug!("Executed notebook at {}", self.temporary_notebook.display());

        self.state = ReportState::Executed;
        Ok(kernel_name)
    }

    /// Export the executed temp notebook to the report path.
    ///
    /// The temp notebook is deleted only once the report is written; on any
    /// failure it stays in place for inspection. Returns the title used.
    pub async fn notebook_to_report(
        &mut self,
        template_path: Option<&Path>,
    ) -> Result<String, DocReportError> {
        if let Some(template) = template_path {
            input::ensure_exists(template).await?;
        }

        let notebook =
            read_notebook(&self.temporary_notebook, self.config.notebook_version).await?;
        let title = self.resolve_title(&notebook);
        self.cells = notebook.cells.len();
        info!(
            "Exporting {} as '{}'",
            self.temporary_notebook.display(),
            title
        );

        let request = ExportRequest {
            notebook_path: self.temporary_notebook.clone(),
            notebook,
            title: title.clone(),
            template_path: template_path.map(Path::to_path_buf),
        };
        let exporter = self.config.resolve_exporter();
        let html = tokio::task::spawn_blocking(move || exporter.export(&request))
            .await
            .map_err(|e| DocReportError::Internal(format!("Export task panicked: {}", e)))??;

        input::write_atomic(&self.report_path, html).await?;
        info!("Wrote report {}", self.report_path.display());

        if let Err(e) = tokio::fs::remove_file(&self.temporary_notebook).await {
            warn!(
                "Could not remove temp notebook {}: {}",
                self.temporary_notebook.display(),
                e
            );
        }

        self.state = ReportState::Exported;
        Ok(title)
    }

    /// Strip notebook chrome from the written report, in place.
    pub async fn clean_html(&mut self) -> Result<cleanup::CleanupStats, DocReportError> {
        let html = input::read_text(&self.report_path).await?;
        let (cleaned, stats) = cleanup::clean_html(&html)?;
        input::write_atomic(&self.report_path, cleaned).await?;

        info!(
            "Cleaned {}: {} removed, {} unwrapped, {} tables, {} code blocks",
            self.report_path.display(),
            stats.removed,
            stats.unwrapped,
            stats.tables_stripped,
            stats.code_blocks
        );
        self.state = ReportState::Cleaned;
        Ok(stats)
    }

    /// Execute, export with `config.template_path`, then clean.
    pub async fn generate(&mut self) -> Result<ReportOutput, DocReportError> {
        let total_start = Instant::now();
        let progress: ProgressCallback = self
            .config
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback));
        let mut stats = ReportStats::default();

        // ── Stage 1: Execute ─────────────────────────────────────────────────
        let (kernel_name, ms) =
            run_stage(&progress, ReportStage::Execute, self.execute_notebook()).await?;
        stats.execute_duration_ms = ms;

        // ── Stage 2: Export ──────────────────────────────────────────────────
        let template = self.config.template_path.clone();
        let (title, ms) = run_stage(
            &progress,
            ReportStage::Export,
            self.notebook_to_report(template.as_deref()),
        )
        .await?;
        stats.export_duration_ms = ms;

        // ── Stage 3: Clean ───────────────────────────────────────────────────
        let (cleaned, ms) = run_stage(&progress, ReportStage::Clean, self.clean_html()).await?;
        stats.clean_duration_ms = ms;
        stats.removed_elements = cleaned.removed;
        stats.unwrapped_elements = cleaned.unwrapped;

        stats.cells = self.cells;
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        progress.on_report_complete(&self.report_path);

        info!(
            "Report {} ready in {}ms",
            self.report_path.display(),
            stats.total_duration_ms
        );
        Ok(ReportOutput {
            report_path: self.report_path.clone(),
            title,
            kernel_name,
            stats,
        })
    }

    fn resolve_title(&self, notebook: &Notebook) -> String {
        notebook
            .metadata
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_title.clone())
    }
}

/// Run the full pipeline for one notebook.
pub async fn generate_report(
    notebook_path: impl Into<PathBuf>,
    report_folder: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportOutput, DocReportError> {
    NotebookReport::new(notebook_path, report_folder, config.clone())
        .generate()
        .await
}

/// Synchronous wrapper around [`generate_report`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_report_sync(
    notebook_path: impl Into<PathBuf>,
    report_folder: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportOutput, DocReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_report(notebook_path, report_folder, config))
}

/// File stem with underscores turned into spaces: `my_report.ipynb` → `my report`.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

async fn run_stage<T>(
    progress: &ProgressCallback,
    stage: ReportStage,
    fut: impl Future<Output = Result<T, DocReportError>>,
) -> Result<(T, u64), DocReportError> {
    progress.on_stage_start(stage);
    let start = Instant::now();
    match fut.await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            progress.on_stage_complete(stage, elapsed_ms);
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            progress.on_stage_error(stage, &e.to_string());
            Err(e)
        }
    }
}
