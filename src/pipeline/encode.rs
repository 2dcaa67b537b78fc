//! Image encoding: file bytes → base64 `data:` URI.
//!
//! The MIME subtype is the file extension taken verbatim (`.JPG` stays `JPG`,
//! `.svg` becomes `image/svg`), and a single space follows the comma. Both
//! quirks are kept because existing consumers of the generated HTML match on
//! this exact shape.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// Build the `data:` URI for an image's raw bytes.
///
/// `path` is only consulted for its extension.
pub fn to_data_uri(path: &Path, bytes: &[u8]) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let b64 = STANDARD.encode(bytes);
    debug!(
        "Encoded {} → {} bytes base64",
        path.display(),
        b64.len()
    );

    format!("data:image/{};base64, {}", extension, b64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_to_original_bytes() {
        let bytes = [0x89u8, b'P', b'N'];
        let uri = to_data_uri(Path::new("/docs/stub.png"), &bytes);
        assert!(uri.starts_with("data:image/png;base64, "), "got: {uri}");

        let payload = uri.rsplit(", ").next().unwrap();
        let decoded = STANDARD.decode(payload).expect("valid base64");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn extension_is_not_normalised() {
        let uri = to_data_uri(Path::new("photo.JPG"), b"abc");
        assert_eq!(uri, "data:image/JPG;base64, YWJj");
    }

    #[test]
    fn missing_extension_leaves_subtype_empty() {
        let uri = to_data_uri(Path::new("figure"), b"abc");
        assert_eq!(uri, "data:image/;base64, YWJj");
    }
}
