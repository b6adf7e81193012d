use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Formats the label scanner decodes and forwards.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

#[derive(Debug, Error)]
pub enum ImageInputError {
    #[error("Failed to read image '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not a supported image file")]
    NotAnImage(PathBuf),
    #[error("Image file is empty")]
    Empty,
}

/// An image ready for analysis: bare base64 for the provider plus a data URL
/// for the preview thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub base64: String,
    pub preview_url: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, ImageInputError> {
        if bytes.is_empty() {
            return Err(ImageInputError::Empty);
        }
        let base64 = general_purpose::STANDARD.encode(bytes);
        let preview_url = format!("data:{};base64,{}", mime_type, base64);
        Ok(Self {
            mime_type: mime_type.to_string(),
            base64,
            preview_url,
        })
    }
}

/// Removes a leading `data:...;base64,` prefix if present.
pub fn strip_data_url_prefix(content: &str) -> &str {
    if content.starts_with("data:") {
        if let Some((_, payload)) = content.split_once(',') {
            return payload;
        }
    }
    content
}

/// MIME type of `bytes` when they are a decodable image in an allowed format.
/// A recognised signature whose header does not decode is not an image.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let format = reader.format()?;
    if !ALLOWED_FORMATS.contains(&format) {
        return None;
    }
    reader.into_dimensions().ok()?;
    Some(format.to_mime_type())
}

/// Extension-based guess, only for formats without a recognised signature
/// (HEIC/HEIF photos from phones).
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path)
        .first_raw()
        .filter(|mime| matches!(*mime, "image/heic" | "image/heif"))
}

pub async fn load_image(path: &Path) -> Result<ImagePayload, ImageInputError> {
    let bytes = fs::read(path).await.map_err(|source| ImageInputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ImageInputError::Empty);
    }
    let signature = image::guess_format(&bytes).ok();
    let mime_type = match signature {
        Some(_) => detect_image_mime(&bytes),
        None => mime_from_extension(path),
    }
    .ok_or_else(|| ImageInputError::NotAnImage(path.to_path_buf()))?;
    tracing::debug!(path = %path.display(), mime_type, bytes = bytes.len(), "Loaded image");
    ImagePayload::from_bytes(&bytes, mime_type)
}
