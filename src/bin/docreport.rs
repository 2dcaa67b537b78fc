//! CLI binary for docreport.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReportConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docreport::{
    convert_markdown, convert_markdown_to_file, generate_report, ExporterKind, ProgressCallback,
    ReportConfig, ReportProgressCallback, ReportStage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner naming the running stage, with one log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
    failed: AtomicBool,
}

impl CliProgressCallback {
    fn new(notebook: &Path) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message(notebook.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            failed: AtomicBool::new(false),
        })
    }
}

fn stage_label(stage: ReportStage) -> &'static str {
    match stage {
        ReportStage::Execute => "Executing",
        ReportStage::Export => "Exporting",
        ReportStage::Clean => "Cleaning",
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: ReportStage) {
        self.bar.set_prefix(stage_label(stage));
        self.bar.reset_elapsed();
    }

    fn on_stage_complete(&self, stage: ReportStage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<8} {}",
            green("✓"),
            stage,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: ReportStage, error: &str) {
        self.failed.store(true, Ordering::SeqCst);

        // Keep the first line only; the full chain is printed by anyhow.
        let first = error.lines().next().unwrap_or_default();
        self.bar
            .println(format!("  {} {:<8} {}", red("✗"), stage, red(first)));
        self.bar.finish_and_clear();
    }

    fn on_report_complete(&self, report_path: &Path) {
        self.bar.finish_and_clear();
        if !self.failed.load(Ordering::SeqCst) {
            eprintln!(
                "{} report written to {}",
                green("✔"),
                bold(&report_path.display().to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to stdout
  docreport markdown README.md

  # Markdown to a file, with a custom shell
  docreport markdown guide.md -o guide.html --template shell.html

  # Execute a notebook and write a cleaned report
  docreport notebook analysis/sales.ipynb --report-folder reports

  # Render without nbconvert's HTML exporter
  docreport notebook sales.ipynb --report-folder reports --exporter builtin

  # JSON summary of the run
  docreport notebook sales.ipynb --report-folder reports --json

TEMPLATES:
  markdown   exactly one {{content}} placeholder
  notebook   nbconvert template file, or for --exporter builtin an HTML
             shell with {{ title }} and exactly one {{ body }}

ENVIRONMENT VARIABLES:
  DOCREPORT_TEMPLATE       Default --template
  DOCREPORT_REPORT_FOLDER  Default --report-folder
  DOCREPORT_TIMEOUT        Per-cell timeout in seconds
  DOCREPORT_JUPYTER        Jupyter program (default: jupyter)
  DOCREPORT_EXPORTER       nbconvert | builtin
  DOCREPORT_TEMP_DIR       Folder for the executed temp notebook
  RUST_LOG                 Overrides the log filter
"#;

/// Convert Markdown and Jupyter notebooks to self-contained HTML.
#[derive(Parser, Debug)]
#[command(
    name = "docreport",
    version,
    about = "Convert Markdown and Jupyter notebooks to self-contained HTML",
    long_about = "Convert Markdown files to standalone HTML with every local image inlined, \
or execute a Jupyter notebook and turn it into a cleaned HTML report.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCREPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCREPORT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Markdown file to standalone HTML.
    Markdown {
        /// Markdown source file.
        input: PathBuf,

        /// Write HTML to this file instead of stdout.
        #[arg(short, long, env = "DOCREPORT_OUTPUT")]
        output: Option<PathBuf>,

        /// HTML shell with one {{content}} placeholder.
        #[arg(long, env = "DOCREPORT_TEMPLATE")]
        template: Option<PathBuf>,
    },

    /// Execute a notebook and write a cleaned HTML report.
    Notebook {
        /// Notebook (.ipynb) file.
        input: PathBuf,

        /// Folder the report is written to.
        #[arg(long, env = "DOCREPORT_REPORT_FOLDER")]
        report_folder: PathBuf,

        /// Template passed to the HTML exporter.
        #[arg(long, env = "DOCREPORT_TEMPLATE")]
        template: Option<PathBuf>,

        /// Per-cell execution timeout in seconds.
        #[arg(long, env = "DOCREPORT_TIMEOUT", default_value_t = 3600)]
        timeout: u64,

        /// Folder for the executed temp notebook [default: system temp dir].
        #[arg(long, env = "DOCREPORT_TEMP_DIR")]
        temp_dir: Option<PathBuf>,

        /// Jupyter program used for execution and nbconvert export.
        #[arg(long, env = "DOCREPORT_JUPYTER", default_value = "jupyter")]
        jupyter: String,

        /// HTML exporter.
        #[arg(long, env = "DOCREPORT_EXPORTER", value_enum, default_value = "nbconvert")]
        exporter: ExporterArg,

        /// Print the run summary (ReportOutput) as JSON on stdout.
        #[arg(long, env = "DOCREPORT_JSON")]
        json: bool,

        /// Disable the progress spinner.
        #[arg(long, env = "DOCREPORT_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ExporterArg {
    Nbconvert,
    Builtin,
}

impl From<ExporterArg> for ExporterKind {
    fn from(v: ExporterArg) -> Self {
        match v {
            ExporterArg::Nbconvert => ExporterKind::Nbconvert,
            ExporterArg::Builtin => ExporterKind::Builtin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters while a notebook runs,
    // so INFO logs are suppressed unless asked for.
    let spinner = match cli.command {
        Command::Notebook {
            json, no_progress, ..
        } => !cli.quiet && !no_progress && !json,
        Command::Markdown { .. } => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Markdown {
            ref input,
            ref output,
            ref template,
        } => run_markdown(input, output.as_deref(), template.as_deref(), cli.quiet).await,
        Command::Notebook {
            ref input,
            ref report_folder,
            ref template,
            timeout,
            ref temp_dir,
            ref jupyter,
            ref exporter,
            json,
            ..
        } => {
            let progress: Option<ProgressCallback> = if spinner {
                Some(CliProgressCallback::new(input) as Arc<dyn ReportProgressCallback>)
            } else {
                None
            };

            let mut builder = ReportConfig::builder()
                .timeout_secs(timeout)
                .jupyter_program(jupyter.clone())
                .exporter_kind(exporter.clone().into());
            if let Some(dir) = temp_dir {
                builder = builder.temp_dir(dir);
            }
            if let Some(tpl) = template {
                builder = builder.template_path(tpl);
            }
            if let Some(cb) = progress {
                builder = builder.progress_callback(cb);
            }
            let config = builder.build().context("Invalid configuration")?;

            let output = generate_report(input, report_folder, &config)
                .await
                .with_context(|| format!("Report generation failed for {}", input.display()))?;

            if json {
                let json =
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
                println!("{json}");
            } else if !cli.quiet && !spinner {
                eprintln!(
                    "Wrote {} ({} cells) in {}ms",
                    output.report_path.display(),
                    output.stats.cells,
                    output.stats.total_duration_ms
                );
            }
            Ok(())
        }
    }
}

async fn run_markdown(
    input: &Path,
    output: Option<&Path>,
    template: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    match output {
        Some(path) => {
            let written = convert_markdown_to_file(input, Some(path), template)
                .await
                .with_context(|| format!("Conversion failed for {}", input.display()))?;
            if !quiet {
                eprintln!(
                    "{} {}",
                    green("✔"),
                    bold(&written.display().to_string())
                );
            }
        }
        None => {
            let html = convert_markdown(input, template)
                .await
                .with_context(|| format!("Conversion failed for {}", input.display()))?;

            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(html.as_bytes())
                .context("Failed to write to stdout")?;
            if !html.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notebook_flags_parse() {
        let cli = Cli::try_parse_from([
            "docreport",
            "notebook",
            "sales.ipynb",
            "--report-folder",
            "reports",
            "--exporter",
            "builtin",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Notebook {
                exporter: ExporterArg::Builtin,
                timeout: 3600,
                ..
            }
        ));
    }

    #[test]
    fn nb_version_flag_is_not_offered() {
        let result = Cli::try_parse_from([
            "docreport",
            "notebook",
            "sales.ipynb",
            "--report-folder",
            "reports",
            "--nb-version",
            "4",
        ]);
        assert!(result.is_err());
    }
}
