//! Template injection: place a rendered fragment into an HTML shell.
//!
//! Templates mark substitution points with Jinja-style `{{ name }}` tags
//! (inner whitespace optional). The content tag must occur exactly once; a
//! template without it would silently drop the document, and one with two
//! copies would duplicate it.

use crate::error::DocReportError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Default shell used by the Markdown converter when no template is given.
pub const DEFAULT_DOCUMENT_TEMPLATE: &str = r#"<html>
    <head>
    </head>
    <body>
        <div class="container">
        {{content}}
        </div>
    </body>
</html>"#;

static RE_CONTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*content\s*\}\}").unwrap());
static RE_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*body\s*\}\}").unwrap());
static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*title\s*\}\}").unwrap());

/// Substitute `content` for the single `{{content}}` tag of `template`.
///
/// `template_path` is used for error reporting only.
pub fn inject_content(
    template: &str,
    content: &str,
    template_path: Option<&Path>,
) -> Result<String, DocReportError> {
    replace_single(&RE_CONTENT, template, content, template_path)
}

/// Fill a notebook page template: `{{ title }}` anywhere, `{{ body }}` once.
pub fn inject_page(
    template: &str,
    title: &str,
    body: &str,
    template_path: Option<&Path>,
) -> Result<String, DocReportError> {
    let (before, after) = split_single(&RE_BODY, template, template_path)?;
    // Titles are plain text and may contain `$`, so no capture expansion.
    let fill = |part: &str| RE_TITLE.replace_all(part, regex::NoExpand(title)).into_owned();
    Ok(format!("{}{}{}", fill(before), body, fill(after)))
}

fn replace_single(
    re: &Regex,
    template: &str,
    value: &str,
    template_path: Option<&Path>,
) -> Result<String, DocReportError> {
    let (before, after) = split_single(re, template, template_path)?;
    let mut out = String::with_capacity(template.len() + value.len());
    out.push_str(before);
    out.push_str(value);
    out.push_str(after);
    Ok(out)
}

/// Split `template` around the only match of `re`.
fn split_single<'t>(
    re: &Regex,
    template: &'t str,
    template_path: Option<&Path>,
) -> Result<(&'t str, &'t str), DocReportError> {
    let mut matches = re.find_iter(template);
    let (first, extra) = (matches.next(), matches.count());

    match first {
        Some(m) if extra == 0 => Ok((&template[..m.start()], &template[m.end()..])),
        _ => Err(DocReportError::InvalidTemplate {
            path: template_path.map(Path::to_path_buf),
            found: first.map_or(0, |_| 1 + extra),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_wraps_in_container() {
        let out = inject_content(DEFAULT_DOCUMENT_TEMPLATE, "<h1>Title</h1>", None).unwrap();
        let open = out.find(r#"<div class="container">"#).unwrap();
        let h1 = out.find("<h1>Title</h1>").unwrap();
        let close = out.rfind("</div>").unwrap();
        assert!(open < h1 && h1 < close);
    }

    #[test]
    fn placeholder_whitespace_is_allowed() {
        let out = inject_content("<main>{{  content }}</main>", "x", None).unwrap();
        assert_eq!(out, "<main>x</main>");
    }

    #[test]
    fn content_with_dollar_signs_is_literal() {
        let out = inject_content("{{content}}", "costs $1 and $2", None).unwrap();
        assert_eq!(out, "costs $1 and $2");
    }

    #[test]
    fn missing_placeholder_is_rejected() {
        let err = inject_content("<html></html>", "x", None).unwrap_err();
        assert!(matches!(
            err,
            DocReportError::InvalidTemplate { found: 0, .. }
        ));
    }

    #[test]
    fn duplicate_placeholder_is_rejected() {
        let err =
            inject_content("{{content}}{{ content }}", "x", Some(Path::new("t.html"))).unwrap_err();
        match err {
            DocReportError::InvalidTemplate { path, found } => {
                assert_eq!(found, 2);
                assert_eq!(path.as_deref(), Some(Path::new("t.html")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn page_template_repeats_title() {
        let out = inject_page(
            "<title>{{ title }}</title><h1>{{title}}</h1>{{ body }}",
            "My $report",
            "<p>b</p>",
            None,
        )
        .unwrap();
        assert_eq!(out, "<title>My $report</title><h1>My $report</h1><p>b</p>");
    }

    #[test]
    fn page_body_is_not_rescanned_for_tags() {
        let out = inject_page("{{ body }}", "T", "<code>{{ title }}</code>", None).unwrap();
        assert_eq!(out, "<code>{{ title }}</code>");
    }
}
