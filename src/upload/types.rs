//! Image file types shared by the validator and the compressor

use image::ImageFormat;
use std::path::Path;

/// MIME type used when the file extension is not a known image format
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// One mebibyte, the unit every size limit is expressed in
pub const MIB: u64 = 1024 * 1024;

/// A user-selected image held in memory
///
/// Plays the role of a browser `File`: a name, a declared content type and
/// the raw bytes. Never written anywhere except by the `compress` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// File name including extension (e.g., "palm.png")
    pub name: String,
    /// Declared MIME type (e.g., "image/png")
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Create an image file from its parts
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(name, mime_type_for_path(path), bytes))
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size in mebibytes, for log lines
    pub fn size_mib(&self) -> f64 {
        self.size() as f64 / MIB as f64
    }
}

/// Declared content type for a path, derived from its extension
pub fn mime_type_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME_TYPE.to_string())
}
