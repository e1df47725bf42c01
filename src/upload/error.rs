//! Upload error types
//!
//! Validation failures carry the message shown to the user. Compression
//! failures are recovered by the caller and only ever logged.

use thiserror::Error;

use super::types::MIB;

/// Errors that can occur while validating or compressing an upload
#[derive(Error, Debug)]
pub enum ImageError {
    /// Declared MIME type is not `image/*`
    #[error("Please select an image file (JPG or PNG)")]
    InvalidType { mime_type: String },

    /// File is larger than the upload limit
    #[error("Image file must be smaller than {}MB", format_mib(.max))]
    TooLarge { size: u64, max: u64 },

    /// Selected file could not be read
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),

    /// Source bytes could not be decoded as an image
    #[error("Image decode error: {0}")]
    DecodeError(String),

    /// JPEG re-encoding failed or produced no output
    #[error("Image encode error: {0}")]
    EncodeError(String),
}

impl ImageError {
    /// Whether the error came from compression (recoverable by falling back)
    pub fn is_compression(&self) -> bool {
        matches!(self, ImageError::DecodeError(_) | ImageError::EncodeError(_))
    }
}

/// Whole mebibytes print without decimals, anything else with two
fn format_mib(bytes: &u64) -> String {
    if *bytes % MIB == 0 {
        format!("{}", bytes / MIB)
    } else {
        format!("{:.2}", *bytes as f64 / MIB as f64)
    }
}

/// Result type alias for upload operations
pub type ImageResult<T> = Result<T, ImageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImageError::InvalidType {
            mime_type: "text/plain".to_string(),
        };
        assert_eq!(err.to_string(), "Please select an image file (JPG or PNG)");

        let err = ImageError::TooLarge {
            size: 11 * MIB,
            max: 10 * MIB,
        };
        assert_eq!(err.to_string(), "Image file must be smaller than 10MB");
    }

    #[test]
    fn test_fractional_limit_display() {
        let err = ImageError::TooLarge {
            size: MIB,
            max: 512 * 1024,
        };
        assert_eq!(err.to_string(), "Image file must be smaller than 0.50MB");

        let err = ImageError::TooLarge {
            size: 3 * MIB,
            max: 2 * MIB + MIB / 4,
        };
        assert_eq!(err.to_string(), "Image file must be smaller than 2.25MB");
    }

    #[test]
    fn test_is_compression() {
        assert!(ImageError::DecodeError("bad".into()).is_compression());
        assert!(ImageError::EncodeError("empty".into()).is_compression());
        assert!(!ImageError::TooLarge { size: 1, max: 0 }.is_compression());
    }
}
