//! Markdown → HTML fragment rendering.
//!
//! Beyond CommonMark, authored reports use pipe tables, definition lists,
//! fenced code and footnotes. Raw HTML in the source is passed through untouched, because
//! authors routinely drop `<img>` tags with explicit sizes into their notes.

use comrak::{markdown_to_html, Options};

/// Render Markdown source to an HTML5 fragment.
pub fn render(source: &str) -> String {
    markdown_to_html(source, &extra_options())
}

fn extra_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.description_lists = true;
    options.extension.footnotes = true;
    options.render.unsafe_ = true;
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_renders_plain_h1() {
        assert_eq!(render("# Title").trim(), "<h1>Title</h1>");
    }

    #[test]
    fn tables_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "got: {html}");
        assert!(html.contains("<td>1</td>"), "got: {html}");
    }

    #[test]
    fn definition_lists_are_enabled() {
        let html = render("Term\n\n: Definition\n");
        assert!(html.contains("<dl>"), "got: {html}");
        assert!(html.contains("<dt>Term</dt>"), "got: {html}");
    }

    #[test]
    fn fenced_code_keeps_language() {
        let html = render("```python\nprint(1)\n```\n");
        assert!(html.contains("<pre><code class=\"language-python\">"), "got: {html}");
    }

    #[test]
    fn raw_html_images_pass_through() {
        let html = render("<img src=\"./fig.png\" width=\"200\">\n");
        assert!(html.contains("src=\"./fig.png\""), "got: {html}");
    }
}
