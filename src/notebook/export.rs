//! Notebook → HTML export.
//!
//! Two [`HtmlExporter`]s are provided:
//!
//! * [`NbconvertExporter`] — runs `jupyter nbconvert --to html`, optionally
//!   with a custom Jinja template file. The resolved title is written into
//!   the notebook metadata, which nbconvert's templates prefer over the file
//!   name.
//! * [`BuiltinExporter`] — renders the classic notebook page structure in
//!   Rust (cells, prompts, output areas), with Markdown cells rendered by
//!   comrak. It needs no Python and produces exactly the chrome that
//!   [`crate::pipeline::cleanup`] strips.

use crate::error::DocReportError;
use crate::notebook::execute::tail;
use crate::notebook::{mime_text, Cell, CodeCell, Notebook, Output, TextCell};
use crate::pipeline::{markdown, template};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Input for one export.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// The executed notebook on disk (the temp copy).
    pub notebook_path: PathBuf,
    /// The executed notebook.
    pub notebook: Notebook,
    /// Resolved report title.
    pub title: String,
    /// Optional template overriding the exporter's default layout.
    pub template_path: Option<PathBuf>,
}

/// Renders an executed notebook to a complete HTML page.
pub trait HtmlExporter: Send + Sync {
    fn export(&self, request: &ExportRequest) -> Result<String, DocReportError>;
}

/// Which built-in exporter a [`crate::config::ReportConfig`] falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExporterKind {
    /// `jupyter nbconvert --to html` (default).
    #[default]
    Nbconvert,
    /// Pure-Rust classic layout.
    Builtin,
}

// ── nbconvert ────────────────────────────────────────────────────────────────

/// Exports with `jupyter nbconvert --to html --stdout`.
#[derive(Debug, Clone)]
pub struct NbconvertExporter {
    program: String,
}

impl Default for NbconvertExporter {
    fn default() -> Self {
        Self::new("jupyter")
    }
}

impl NbconvertExporter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl HtmlExporter for NbconvertExporter {
    fn export(&self, request: &ExportRequest) -> Result<String, DocReportError> {
        let export_err = |detail: String| DocReportError::ExportFailed {
            path: request.notebook_path.clone(),
            detail,
        };

        // nbconvert reads the title from metadata; hand it a titled copy.
        let mut notebook = request.notebook.clone();
        notebook.metadata.title = Some(request.title.clone());
        let mut staged = tempfile::Builder::new()
            .prefix("docreport-")
            .suffix(".ipynb")
            .tempfile()
            .map_err(|e| export_err(format!("staging notebook: {e}")))?;
        staged
            .write_all(notebook.to_json()?.as_bytes())
            .map_err(|e| export_err(format!("staging notebook: {e}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("nbconvert").args(["--to", "html", "--stdout"]);
        if let Some(ref tpl) = request.template_path {
            cmd.arg("--template-file").arg(tpl);
        }
        cmd.arg(staged.path());

        info!("Exporting {} via nbconvert", request.notebook_path.display());
        let output = cmd
            .output()
            .map_err(|source| DocReportError::ExecutorUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(export_err(format!(
                "{} (exit {})",
                tail(&stderr, 20),
                output.status
            )));
        }

        String::from_utf8(output.stdout).map_err(|e| export_err(format!("non UTF-8 output: {e}")))
    }
}

// ── Builtin ──────────────────────────────────────────────────────────────────

/// Default page shell for [`BuiltinExporter`].
pub const DEFAULT_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
</head>
<body>
<div tabindex="-1" id="notebook" class="border-box-sizing">
<div class="container" id="notebook-container">
{{ body }}
</div>
</div>
</body>
</html>
"#;

/// Renders the classic notebook HTML layout without external tools.
///
/// Custom templates use `{{ title }}` (any number of times) and exactly one
/// `{{ body }}`.
#[derive(Debug, Clone, Default)]
pub struct BuiltinExporter;

impl HtmlExporter for BuiltinExporter {
    fn export(&self, request: &ExportRequest) -> Result<String, DocReportError> {
        let page = match request.template_path {
            Some(ref path) => std::fs::read_to_string(path)
                .map_err(|e| DocReportError::from_read(path.as_path(), e))?,
            None => DEFAULT_PAGE_TEMPLATE.to_string(),
        };

        let body = render_cells(&request.notebook);
        debug!(
            "Rendered {} cells → {} bytes",
            request.notebook.cells.len(),
            body.len()
        );
        template::inject_page(
            &page,
            &escape_html(&request.title),
            &body,
            request.template_path.as_deref(),
        )
    }
}

/// Render every cell of `notebook` in the classic layout.
pub fn render_cells(notebook: &Notebook) -> String {
    let language = notebook.language();
    let mut body = String::new();
    for cell in &notebook.cells {
        match cell {
            Cell::Markdown(c) => render_markdown_cell(&mut body, c),
            Cell::Code(c) => render_code_cell(&mut body, c, language),
            Cell::Raw(c) => render_raw_cell(&mut body, c),
        }
    }
    body
}

fn render_markdown_cell(out: &mut String, cell: &TextCell) {
    out.push_str(concat!(
        r#"<div class="cell border-box-sizing text_cell rendered">"#,
        r#"<div class="prompt input_prompt"></div>"#,
        r#"<div class="inner_cell">"#,
        r#"<div class="text_cell_render border-box-sizing rendered_html">"#,
        "\n"
    ));
    out.push_str(&markdown::render(&cell.source.text()));
    out.push_str("</div>\n</div>\n</div>\n");
}

/// Raw cells are only emitted when tagged as HTML.
fn render_raw_cell(out: &mut String, cell: &TextCell) {
    let is_html = cell
        .metadata
        .get("raw_mimetype")
        .and_then(|v| v.as_str())
        .is_some_and(|m| m == "text/html");
    if is_html {
        out.push_str(&cell.source.text());
        out.push('\n');
    }
}

fn render_code_cell(out: &mut String, cell: &CodeCell, language: &str) {
    let count = cell
        .execution_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "&nbsp;".to_string());

    out.push_str(r#"<div class="cell border-box-sizing code_cell rendered">"#);
    out.push_str(r#"<div class="input">"#);
    out.push_str(&format!(
        r#"<div class="prompt input_prompt">In&nbsp;[{}]:</div>"#,
        count
    ));
    out.push_str(&format!(
        r#"<div class="inner_cell"><div class="input_area"><div class="highlight hl-{}"><pre>{}</pre></div></div></div>"#,
        escape_html(language),
        escape_html(&cell.source.text())
    ));
    out.push_str("</div>\n");

    if !cell.outputs.is_empty() {
        out.push_str(r#"<div class="output_wrapper"><div class="output">"#);
        for output in &cell.outputs {
            render_output(out, output);
        }
        out.push_str("</div></div>\n");
    }
    out.push_str("</div>\n");
}

fn render_output(out: &mut String, output: &Output) {
    out.push_str(r#"<div class="output_area">"#);
    match output {
        Output::Stream { name, text } => {
            out.push_str(r#"<div class="prompt"></div>"#);
            out.push_str(&format!(
                r#"<div class="output_subarea output_stream output_{} output_text"><pre>{}</pre></div>"#,
                escape_html(name),
                escape_html(&text.text())
            ));
        }
        Output::ExecuteResult {
            execution_count,
            data,
            ..
        } => {
            let count = execution_count.map(|n| n.to_string()).unwrap_or_default();
            out.push_str(&format!(
                r#"<div class="prompt output_prompt">Out[{}]:</div>"#,
                count
            ));
            render_mime_bundle(out, data, "output_execute_result");
        }
        Output::DisplayData { data, .. } => {
            out.push_str(r#"<div class="prompt"></div>"#);
            render_mime_bundle(out, data, "");
        }
        Output::Error {
            ename,
            evalue,
            traceback,
        } => {
            out.push_str(r#"<div class="prompt"></div>"#);
            let text = if traceback.is_empty() {
                format!("{ename}: {evalue}")
            } else {
                traceback.join("\n")
            };
            out.push_str(&format!(
                r#"<div class="output_subarea output_text output_error"><pre>{}</pre></div>"#,
                escape_html(&strip_ansi(&text))
            ));
        }
    }
    out.push_str("</div>\n");
}

/// Pick the richest representation nbconvert would show.
fn render_mime_bundle(out: &mut String, data: &serde_json::Map<String, serde_json::Value>, extra: &str) {
    let subarea = |kind: &str| {
        if extra.is_empty() {
            format!("output_subarea {kind}")
        } else {
            format!("output_subarea {kind} {extra}")
        }
    };

    if let Some(html) = mime_text(data, "text/html") {
        out.push_str(&format!(
            r#"<div class="{}">{}</div>"#,
            subarea("output_html rendered_html"),
            html
        ));
    } else if let Some(svg) = mime_text(data, "image/svg+xml") {
        out.push_str(&format!(r#"<div class="{}">{}</div>"#, subarea("output_svg"), svg));
    } else if let Some((mime, payload)) = ["image/png", "image/jpeg", "image/gif"]
        .iter()
        .find_map(|m| mime_text(data, m).map(|p| (*m, p)))
    {
        let kind = format!("output_{}", mime.trim_start_matches("image/"));
        out.push_str(&format!(
            r#"<div class="{}"><img src="data:{};base64,{}"></div>"#,
            subarea(&kind),
            mime,
            payload.trim()
        ));
    } else if let Some(text) = mime_text(data, "text/plain") {
        out.push_str(&format!(
            r#"<div class="{}"><pre>{}</pre></div>"#,
            subarea("output_text"),
            escape_html(&text)
        ));
    }
}

static RE_ANSI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Remove terminal colour codes that kernels put in tracebacks.
fn strip_ansi(text: &str) -> String {
    RE_ANSI.replace_all(text, "").into_owned()
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
