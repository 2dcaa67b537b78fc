//! File-system access shared by both pipelines.
//!
//! Reads map `io::ErrorKind::NotFound` to [`DocReportError::FileNotFound`] so
//! a missing source, template, image or temp notebook surfaces with its path.
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a failed run never leaves a half-written report behind.

use crate::error::DocReportError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Read a UTF-8 text file.
pub async fn read_text(path: &Path) -> Result<String, DocReportError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DocReportError::from_read(path, e))?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Read a file's raw bytes.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>, DocReportError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DocReportError::from_read(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Fail with `FileNotFound` unless `path` exists.
pub async fn ensure_exists(path: &Path) -> Result<(), DocReportError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(DocReportError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(DocReportError::from_read(path, e)),
    }
}

/// Atomically write `contents` (UTF-8) to `path`.
///
/// Parent directories are created as needed. The data lands in a temp file
/// next to the destination and is renamed over it once fully written.
pub async fn write_atomic(path: &Path, contents: String) -> Result<(), DocReportError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, contents.as_bytes()))
        .await
        .map_err(|e| DocReportError::Internal(format!("Write task panicked: {}", e)))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<(), DocReportError> {
    let write_err = |source: std::io::Error| DocReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let err = read_text(Path::new("/definitely/not/here.md"))
            .await
            .unwrap_err();
        match err {
            DocReportError::FileNotFound { path } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.md"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested/out/report.html");
        write_atomic(&target, "<p>é</p>".to_string()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<p>é</p>");
    }

    #[tokio::test]
    async fn write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("report.html");
        std::fs::write(&target, "old").unwrap();
        write_atomic(&target, "new".to_string()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        // Only the report remains; the temp file was renamed away.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn ensure_exists_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("template.html");
        assert!(matches!(
            ensure_exists(&missing).await,
            Err(DocReportError::FileNotFound { .. })
        ));
        std::fs::write(&missing, "{{content}}").unwrap();
        ensure_exists(&missing).await.unwrap();
    }
}
