/// Result exporter: save a generated try-on image to disk
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::TryOnError;
use crate::state::data::EncodedImage;

/// Prefix of every exported file name
pub const EXPORT_PREFIX: &str = "virtual-try-on";

/// Extension used when the content type has no usable subtype
pub const DEFAULT_EXTENSION: &str = "png";

/// File extension for a content type: the subtype after the `/`, without
/// any structured-syntax suffix
///
/// `image/png` → `png`, `image/jpeg; q=1` → `jpeg`, `image/svg+xml` → `svg`,
/// `image` → `png`
pub fn extension_for(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    let subtype = essence
        .split_once('/')
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or_default().trim())
        .unwrap_or_default();

    if subtype.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        subtype.to_ascii_lowercase()
    }
}

/// Suggested file name, e.g. `virtual-try-on-1718000000000.png`.
/// `token` keeps repeated exports in one session from colliding.
pub fn suggested_file_name(content_type: &str, token: i64) -> String {
    format!("{}-{}.{}", EXPORT_PREFIX, token, extension_for(content_type))
}

/// Uniqueness token for a new export (milliseconds since the epoch)
pub fn export_token() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Where the save dialog starts
pub fn default_export_dir() -> Option<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::picture_dir)
        .or_else(dirs::home_dir)
}

/// Write the session's current result to `path`.
///
/// The payload is decoded up front so the returned future owns everything
/// it needs. Resolves to `Ok(None)` without touching the disk when there is
/// no result.
pub fn save(
    image: Option<&EncodedImage>,
    path: PathBuf,
) -> impl Future<Output = Result<Option<PathBuf>, TryOnError>> + Send + 'static {
    let decoded = image.map(EncodedImage::decode);

    async move {
        let Some(decoded) = decoded else {
            log::warn!("Export requested with no result, ignoring");
            return Ok(None);
        };

        let bytes = decoded.map_err(|e| export_error(&path, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| export_error(&path, e))?;

        log::info!("💾 Saved try-on result to {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(path))
    }
}

fn export_error(path: &Path, err: impl std::fmt::Display) -> TryOnError {
    TryOnError::ExportFailure {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpeg");
        assert_eq!(extension_for("image/WEBP; charset=binary"), "webp");
        assert_eq!(extension_for("image/svg+xml"), "svg");
        assert_eq!(extension_for("image/+xml"), DEFAULT_EXTENSION);
        assert_eq!(extension_for("image/"), DEFAULT_EXTENSION);
        assert_eq!(extension_for("image"), DEFAULT_EXTENSION);
        assert_eq!(extension_for(""), DEFAULT_EXTENSION);
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name("image/jpeg", 42), "virtual-try-on-42.jpeg");
        assert_eq!(suggested_file_name("image/svg+xml", 7), "virtual-try-on-7.svg");

        let first = suggested_file_name("image/png", 1000);
        let second = suggested_file_name("image/png", 1001);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("virtual-try-on-1.png");
        let image = EncodedImage::from_bytes(b"\x89PNG result", "image/png");

        let saved = save(Some(&image), path.clone()).await.unwrap();

        assert_eq!(saved, Some(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG result".to_vec());
    }

    #[tokio::test]
    async fn test_save_without_result_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing.png");

        assert_eq!(save(None, path.clone()).await, Ok(None));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_outlives_the_borrowed_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.png");

        let pending = {
            let image = EncodedImage::from_bytes(b"result", "image/png");
            save(Some(&image), path.clone())
        };

        assert_eq!(pending.await, Ok(Some(path.clone())));
        assert_eq!(std::fs::read(&path).unwrap(), b"result".to_vec());
    }

    #[tokio::test]
    async fn test_save_reports_write_failure() {
        let image = EncodedImage::from_bytes(b"data", "image/png");
        let path = PathBuf::from("/nonexistent/dir/out.png");

        let err = save(Some(&image), path).await.unwrap_err();
        assert!(matches!(err, TryOnError::ExportFailure { .. }));
    }

    #[tokio::test]
    async fn test_save_reports_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let image = EncodedImage::new("not base64!!", "image/png");

        let err = save(Some(&image), dir.path().join("bad.png")).await.unwrap_err();
        assert!(matches!(err, TryOnError::ExportFailure { .. }));
    }
}
