//! Upload validation
//!
//! Checks the declared content type and the byte size before anything is
//! decoded or sent over the network.

use std::path::Path;

use super::error::{ImageError, ImageResult};
use super::types::{mime_type_for_path, ImageFile, MIB};

/// Default upload limit: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * MIB;

/// Rejects files that are not images or are too large
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_bytes: u64,
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl ImageValidator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Reject content types other than `image/*`
    pub fn check_type(&self, mime_type: &str) -> ImageResult<()> {
        if mime_type.starts_with("image/") {
            Ok(())
        } else {
            Err(ImageError::InvalidType {
                mime_type: mime_type.to_string(),
            })
        }
    }

    /// Reject sizes over the upload limit
    pub fn check_size(&self, size: u64) -> ImageResult<()> {
        if size > self.max_bytes {
            Err(ImageError::TooLarge {
                size,
                max: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a file, handing it back unchanged when it passes
    pub fn validate(&self, file: ImageFile) -> ImageResult<ImageFile> {
        if let Err(e) = self.check_type(&file.mime_type) {
            tracing::debug!("Rejected {}: content type {}", file.name, file.mime_type);
            return Err(e);
        }

        if let Err(e) = self.check_size(file.size()) {
            tracing::debug!(
                "Rejected {}: {} bytes exceeds limit of {}",
                file.name,
                file.size(),
                self.max_bytes
            );
            return Err(e);
        }

        Ok(file)
    }

    /// Read and validate a file from disk
    ///
    /// Type and size are checked from the extension and the file metadata
    /// first, so an oversized file is rejected without being read.
    pub async fn load(&self, path: &Path) -> ImageResult<ImageFile> {
        self.check_type(&mime_type_for_path(path))?;

        let size = tokio::fs::metadata(path).await?.len();
        if let Err(e) = self.check_size(size) {
            tracing::debug!("Rejected {:?}: {} bytes on disk", path, size);
            return Err(e);
        }

        // The file may have changed since the metadata was read
        self.validate(ImageFile::from_path(path).await?)
    }
}
