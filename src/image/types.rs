//! Image payloads and the formats the studio understands.

use crate::error::{Result, StudioError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media type attached to generated images.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type back to a known format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// An image held in memory: raw bytes plus their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Media type label, e.g. `image/png`.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Creates a payload from raw bytes.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Decodes a base64 body received from the API.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Result<Self> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| StudioError::Decode(e.to_string()))?;
        Ok(Self::new(mime_type, data))
    }

    /// Returns the same bytes under a different media type.
    pub fn retagged(self, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: self.data,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the known format for this payload's media type, if any.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL, ready to use as an image source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

/// A file handed over by a file picker.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Display name of the file.
    pub name: String,
    /// Media type the file was declared as.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Creates a selected file from its parts.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, declaring its media type from the extension
    /// or, failing that, from its magic bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| StudioError::Read(format!("{}: {e}", path.display())))?;

        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&bytes))
            .map(|f| f.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, mime_type, bytes))
    }

    /// Converts the file into an image payload.
    ///
    /// Fails with [`StudioError::Read`] when the file is empty or not
    /// declared as an image.
    pub fn into_payload(self) -> Result<ImagePayload> {
        if !self.mime_type.starts_with("image/") {
            return Err(StudioError::Read(format!(
                "{} is not an image ({})",
                self.name, self.mime_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(StudioError::Read(format!("{} is empty", self.name)));
        }
        Ok(ImagePayload::new(self.mime_type, self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            ImageFormat::from_mime_type("IMAGE/JPEG"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }

    #[test]
    fn test_data_url() {
        let payload = ImagePayload::new("image/jpeg", vec![1, 2, 3]);
        assert_eq!(payload.to_data_url(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        let err = ImagePayload::from_base64("image/png", "not base64!!").unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));

        let ok = ImagePayload::from_base64("image/png", "AQID").unwrap();
        assert_eq!(ok.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_retagged_keeps_bytes() {
        let payload = ImagePayload::new("image/png", vec![9, 9]).retagged("image/jpeg");
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.data, vec![9, 9]);
        assert_eq!(payload.format(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_selected_file_from_path_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpeg");
        std::fs::write(&path, JPEG_MAGIC).unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "cat.jpeg");
        assert_eq!(file.mime_type, "image/jpeg");
    }

    #[test]
    fn test_selected_file_from_path_sniffs_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.mime_type, "image/png");
    }

    #[test]
    fn test_selected_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, StudioError::Read(_)));
    }

    #[test]
    fn test_into_payload_rejects_non_images() {
        let err = SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec())
            .into_payload()
            .unwrap_err();
        assert!(matches!(err, StudioError::Read(_)));

        let err = SelectedFile::new("empty.png", "image/png", Vec::new())
            .into_payload()
            .unwrap_err();
        assert!(matches!(err, StudioError::Read(_)));
    }
}
