//! Image inlining: replace `<img src>` references with embedded data URIs.
//!
//! Sources starting with `./` are resolved against the source document's
//! folder; anything else is used as-is as a file path. `data:` URIs are
//! already inlined and remote `http(s)://` URLs are never fetched, so both
//! are left alone.
//!
//! Replacement is a plain substring replace over the whole document: if the
//! same `src` string appears in body text it is rewritten too.

use crate::error::DocReportError;
use crate::pipeline::{dom, encode, input};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An `<img src>` value paired with the file it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Attribute value exactly as it appears in the document.
    pub src: String,
    /// File to read for the image bytes.
    pub path: PathBuf,
}

/// Resolve an `src` value against the document's folder.
///
/// Markdown renderers percent-encode link destinations (`my fig.png` becomes
/// `my%20fig.png`), so the value is decoded before it is used as a path.
/// Sequences that do not decode to UTF-8 are kept verbatim.
pub fn resolve_src(src: &str, parent: &Path) -> PathBuf {
    let decoded = percent_decode_str(src)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(src));
    match decoded.strip_prefix("./") {
        Some(relative) => parent.join(relative),
        None => PathBuf::from(decoded.as_ref()),
    }
}

/// True for sources that need no file read.
fn is_inline_or_remote(src: &str) -> bool {
    src.starts_with("data:") || src.starts_with("http://") || src.starts_with("https://")
}

/// Collect the distinct local image references of an HTML document.
///
/// Order follows first appearance in the document.
pub fn extract_image_references(html: &str, parent: &Path) -> Vec<ImageReference> {
    let dom = dom::parse(html);
    let mut refs: Vec<ImageReference> = Vec::new();

    for img in dom::find_elements(&dom.document, "img") {
        let Some(src) = dom::attribute(&img, "src") else {
            continue;
        };
        if src.is_empty() || is_inline_or_remote(&src) {
            debug!("Skipping image source {:.40}", src);
            continue;
        }
        if refs.iter().any(|r| r.src == src) {
            continue;
        }
        let path = resolve_src(&src, parent);
        refs.push(ImageReference { src, path });
    }

    refs
}

/// Embed every local image of `html` as a base64 data URI.
///
/// Fails with [`DocReportError::FileNotFound`] on the first missing image;
/// no partially inlined document is returned.
pub async fn inline_images(html: &str, parent: &Path) -> Result<String, DocReportError> {
    let refs = extract_image_references(html, parent);
    let mut doc = html.to_string();

    for image in &refs {
        let bytes = input::read_bytes(&image.path).await?;
        let uri = encode::to_data_uri(&image.path, &bytes);
        doc = doc.replace(&image.src, &uri);
    }

    if !refs.is_empty() {
        info!("Inlined {} image(s)", refs.len());
    }
    Ok(doc)
}
