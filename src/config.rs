//! Configuration for notebook report generation.
//!
//! All knobs live in [`ReportConfig`], built via [`ReportConfigBuilder`].
//! Unset fields fall back to documented defaults, and the external
//! collaborators (executor and exporter) can be swapped for pre-built
//! implementations, which is how the test-suite runs without Jupyter.
//!
//! The Markdown converter has no configuration beyond its optional template,
//! so it takes that as a plain argument.

use crate::error::DocReportError;
use crate::notebook::execute::{JupyterExecutor, NotebookExecutor};
use crate::notebook::export::{BuiltinExporter, ExporterKind, HtmlExporter, NbconvertExporter};
use crate::notebook::DEFAULT_NBFORMAT;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a notebook → HTML report run.
///
/// # Example
/// ```rust
/// use docreport::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .timeout_secs(600)
///     .temp_dir("/var/tmp")
///     .build()
///     .unwrap();
/// assert_eq!(config.notebook_version, 4);
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Notebook format major version to read. Default: 4.
    ///
    /// Only 4 is accepted: notebooks are read as-is, never upgraded from an
    /// older format, so [`ReportConfigBuilder::build`] rejects other values.
    pub notebook_version: u32,

    /// Per-cell execution timeout in seconds. Default: 3600.
    ///
    /// Applies to each cell individually; there is no whole-notebook budget.
    pub timeout_secs: u64,

    /// Folder for the executed temp notebook. Default: the system temp dir.
    ///
    /// The temp file is named after the source notebook, so two notebooks
    /// with the same file name must not be processed concurrently.
    pub temp_dir: PathBuf,

    /// Template overriding the exporter's default layout.
    pub template_path: Option<PathBuf>,

    /// Program used by the Jupyter-backed executor and exporter. Default: "jupyter".
    pub jupyter_program: String,

    /// Exporter used when `exporter` is None. Default: nbconvert.
    pub exporter_kind: ExporterKind,

    /// Pre-constructed executor. Takes precedence over `jupyter_program`.
    pub executor: Option<Arc<dyn NotebookExecutor>>,

    /// Pre-constructed exporter. Takes precedence over `exporter_kind`.
    pub exporter: Option<Arc<dyn HtmlExporter>>,

    /// Stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            notebook_version: DEFAULT_NBFORMAT,
            timeout_secs: 3600,
            temp_dir: std::env::temp_dir(),
            template_path: None,
            jupyter_program: "jupyter".to_string(),
            exporter_kind: ExporterKind::default(),
            executor: None,
            exporter: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("notebook_version", &self.notebook_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("temp_dir", &self.temp_dir)
            .field("template_path", &self.template_path)
            .field("jupyter_program", &self.jupyter_program)
            .field("exporter_kind", &self.exporter_kind)
            .field("executor", &self.executor.as_ref().map(|_| "<dyn NotebookExecutor>"))
            .field("exporter", &self.exporter.as_ref().map(|_| "<dyn HtmlExporter>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ReportProgressCallback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The executor to use: the injected one, else Jupyter.
    pub fn resolve_executor(&self) -> Arc<dyn NotebookExecutor> {
        match self.executor {
            Some(ref executor) => Arc::clone(executor),
            None => Arc::new(JupyterExecutor::new(self.jupyter_program.clone())),
        }
    }

    /// The exporter to use: the injected one, else the `exporter_kind` default.
    pub fn resolve_exporter(&self) -> Arc<dyn HtmlExporter> {
        if let Some(ref exporter) = self.exporter {
            return Arc::clone(exporter);
        }
        match self.exporter_kind {
            ExporterKind::Nbconvert => Arc::new(NbconvertExporter::new(self.jupyter_program.clone())),
            ExporterKind::Builtin => Arc::new(BuiltinExporter),
        }
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn notebook_version(mut self, version: u32) -> Self {
        self.config.notebook_version = version;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = dir.into();
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = Some(path.into());
        self
    }

    pub fn jupyter_program(mut self, program: impl Into<String>) -> Self {
        self.config.jupyter_program = program.into();
        self
    }

    pub fn exporter_kind(mut self, kind: ExporterKind) -> Self {
        self.config.exporter_kind = kind;
        self
    }

    pub fn executor(mut self, executor: Arc<dyn NotebookExecutor>) -> Self {
        self.config.executor = Some(executor);
        self
    }

    pub fn exporter(mut self, exporter: Arc<dyn HtmlExporter>) -> Self {
        self.config.exporter = Some(exporter);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, DocReportError> {
        let c = &self.config;
        if c.notebook_version != DEFAULT_NBFORMAT {
            return Err(DocReportError::InvalidConfig(format!(
                "only nbformat {} notebooks are supported, got {}",
                DEFAULT_NBFORMAT, c.notebook_version
            )));
        }
        if c.jupyter_program.trim().is_empty() {
            return Err(DocReportError::InvalidConfig(
                "jupyter program must not be empty".into(),
            ));
        }
        if c.temp_dir.as_os_str().is_empty() {
            return Err(DocReportError::InvalidConfig(
                "temp dir must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
