//! Markdown → standalone HTML conversion.
//!
//! ```text
//! read source ──▶ render (comrak) ──▶ inject into template
//!             ──▶ find <img src> ──▶ base64-inline ──▶ HTML string
//! ```
//!
//! The result references no external files: every local image becomes a
//! `data:` URI. Nothing is written unless the caller asks for
//! [`convert_markdown_to_file`].

use crate::error::DocReportError;
use crate::pipeline::{images, input, markdown, template};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a Markdown file into a self-contained HTML document.
///
/// # Arguments
/// * `source_path`   — the Markdown file; `./` image paths resolve against its folder
/// * `template_path` — optional HTML shell with exactly one `{{content}}` tag;
///   the built-in shell wraps content in `<div class="container">`
///
/// # Errors
/// [`DocReportError::FileNotFound`] for a missing source, template or image;
/// [`DocReportError::InvalidTemplate`] for a template without exactly one
/// content tag.
pub async fn convert_markdown(
    source_path: impl AsRef<Path>,
    template_path: Option<&Path>,
) -> Result<String, DocReportError> {
    let start = Instant::now();
    let source_path = source_path.as_ref();
    info!("Converting Markdown: {}", source_path.display());

    // ── Step 1: Read source ──────────────────────────────────────────────
    let source = input::read_text(source_path).await?;

    // ── Step 2: Render Markdown ──────────────────────────────────────────
    let fragment = markdown::render(&source);
    debug!("Rendered {} bytes of HTML", fragment.len());

    // ── Step 3: Wrap in template ─────────────────────────────────────────
    let shell = match template_path {
        Some(path) => input::read_text(path).await?,
        None => template::DEFAULT_DOCUMENT_TEMPLATE.to_string(),
    };
    let html = template::inject_content(&shell, &fragment, template_path)?;

    // ── Step 4: Inline images ────────────────────────────────────────────
    let parent = source_path.parent().unwrap_or_else(|| Path::new(""));
    let html = images::inline_images(&html, parent).await?;

    info!(
        "Converted {} in {}ms",
        source_path.display(),
        start.elapsed().as_millis()
    );
    Ok(html)
}

/// Convert a Markdown file and write the HTML next to it (or to `output_path`).
///
/// The default output is `<source folder>/<source stem>.html`. The write is
/// atomic, so an existing file is only replaced by a complete document.
/// Returns the path written.
pub async fn convert_markdown_to_file(
    source_path: impl AsRef<Path>,
    output_path: Option<&Path>,
    template_path: Option<&Path>,
) -> Result<PathBuf, DocReportError> {
    let source_path = source_path.as_ref();
    let html = convert_markdown(source_path, template_path).await?;

    let target = match output_path {
        Some(p) => p.to_path_buf(),
        None => default_html_path(source_path),
    };
    input::write_atomic(&target, html).await?;
    info!("Wrote {}", target.display());
    Ok(target)
}

/// Synchronous wrapper around [`convert_markdown`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_markdown_sync(
    source_path: impl AsRef<Path>,
    template_path: Option<&Path>,
) -> Result<String, DocReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_markdown(source_path, template_path))
}

/// `<folder>/<stem>.html` for a source document.
pub fn default_html_path(source_path: &Path) -> PathBuf {
    source_path.with_extension("html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn default_shell_wraps_heading() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("doc.md");
        std::fs::write(&md, "# Title").unwrap();

        let html = convert_markdown(&md, None).await.unwrap();
        let open = html.find(r#"<div class="container">"#).expect("container div");
        let h1 = html.find("<h1>Title</h1>").expect("heading");
        assert!(open < h1);
        assert!(html[h1..].contains("</div>"));
    }

    #[tokio::test]
    async fn custom_template_is_used() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("doc.md");
        let tpl = dir.path().join("shell.html");
        std::fs::write(&md, "*hi*").unwrap();
        std::fs::write(&tpl, "<article>{{ content }}</article>").unwrap();

        let html = convert_markdown(&md, Some(tpl.as_path())).await.unwrap();
        assert_eq!(html, "<article><p><em>hi</em></p>\n</article>");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("doc.md");
        std::fs::write(&md, "x").unwrap();
        let tpl = dir.path().join("missing.html");

        let err = convert_markdown(&md, Some(tpl.as_path())).await.unwrap_err();
        match err {
            DocReportError::FileNotFound { path } => assert_eq!(path, tpl),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_source_is_not_found() {
        let err = convert_markdown("/nope/doc.md", None).await.unwrap_err();
        assert!(matches!(err, DocReportError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn to_file_defaults_next_to_source() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("notes.md");
        std::fs::write(&md, "# Notes").unwrap();

        let written = convert_markdown_to_file(&md, None, None).await.unwrap();
        assert_eq!(written, dir.path().join("notes.html"));
        assert!(std::fs::read_to_string(&written)
            .unwrap()
            .contains("<h1>Notes</h1>"));
    }

    #[test]
    fn sync_wrapper_converts() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("doc.md");
        std::fs::write(&md, "Term\n\n: Definition\n").unwrap();
        let html = convert_markdown_sync(&md, None).unwrap();
        assert!(html.contains("<dl>"));
    }
}
