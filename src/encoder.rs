/// Encoder: turns a picked or dropped file into an `EncodedImage`
///
/// The declared type gates acceptance (like a browser's `File.type`) and is
/// the content type that gets sent, unless the bytes clearly say otherwise.
use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::error::TryOnError;
use crate::state::data::{EncodedImage, FALLBACK_CONTENT_TYPE};

/// Image extensions the `image` crate can't decode but that are still images
const EXTRA_IMAGE_TYPES: &[(&str, &str)] = &[
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("avif", "image/avif"),
    ("svg", "image/svg+xml"),
    ("jfif", "image/jpeg"),
    ("cur", "image/x-icon"),
];

/// Extensions offered in the file picker
pub const PICKER_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "heic", "heif", "avif",
];

/// A file the user wants to put into a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub path: PathBuf,
    /// Content type reported by the selection surface, if any
    pub declared_type: Option<String>,
}

impl ImageSource {
    /// Build a source for a file on disk, declaring its type from the extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let declared_type = declared_type_for(&path);
        Self { path, declared_type }
    }

    /// File name for display
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Content type implied by a file's extension
pub fn declared_type_for(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();

    if let Some(format) = ImageFormat::from_extension(&extension) {
        return Some(format.to_mime_type().to_string());
    }

    EXTRA_IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| mime.to_string())
}

/// Content type implied by the file contents, if the magic number is known
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

/// `image/png; foo=bar` → `image/png`; `None` unless it names a concrete image subtype
fn declared_essence(declared: Option<&str>) -> Option<String> {
    let essence = declared?.split(';').next()?.trim().to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", subtype)) if !subtype.is_empty() && subtype != "*" => Some(essence),
        _ => None,
    }
}

/// Content type to send for a file.
///
/// The declared type wins. The bytes only fill in a missing declared type
/// or correct one they clearly contradict (a PNG saved as `.jpg`). With
/// neither, the fallback is used.
pub fn resolve_content_type(declared: Option<&str>, bytes: &[u8]) -> String {
    let sniffed = sniff_content_type(bytes);

    match (declared_essence(declared), sniffed) {
        (Some(declared), Some(sniffed)) if declared != sniffed => {
            log::debug!("Declared {} but contents are {}, using {}", declared, sniffed, sniffed);
            sniffed.to_string()
        }
        (Some(declared), _) => declared,
        (None, Some(sniffed)) => sniffed.to_string(),
        (None, None) => FALLBACK_CONTENT_TYPE.to_string(),
    }
}

/// Validate and encode one file
pub async fn encode(source: ImageSource) -> Result<EncodedImage, TryOnError> {
    let declared = source.declared_type.clone().unwrap_or_default();
    if !declared.to_ascii_lowercase().starts_with("image/") {
        log::info!("Rejected {}: declared type {:?}", source.name(), declared);
        return Err(TryOnError::NotAnImage {
            name: source.name(),
            declared: if declared.is_empty() {
                "unknown".to_string()
            } else {
                declared
            },
        });
    }

    let bytes = tokio::fs::read(&source.path)
        .await
        .map_err(|e| TryOnError::ReadFailure {
            path: source.path.clone(),
            message: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(TryOnError::ReadFailure {
            path: source.path.clone(),
            message: "file is empty".to_string(),
        });
    }

    let content_type = resolve_content_type(source.declared_type.as_deref(), &bytes);
    if content_type == FALLBACK_CONTENT_TYPE {
        log::warn!(
            "Could not determine the image type of {} (declared {:?}), sending as {}",
            source.name(),
            declared,
            FALLBACK_CONTENT_TYPE
        );
    }

    log::info!(
        "📷 Encoded {} ({} bytes, {})",
        source.name(),
        bytes.len(),
        content_type
    );

    Ok(EncodedImage::from_bytes(&bytes, content_type))
}
