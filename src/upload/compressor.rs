//! Client-side image optimization
//!
//! Large photos are downscaled and re-encoded as JPEG before upload:
//!
//! 1. Files at or below the threshold (1 MiB) are returned untouched
//! 2. Decode into an in-memory bitmap
//! 3. Clamp the longer side to `max_dimension`, keeping the aspect ratio
//! 4. Resample with a triangle (bilinear) filter
//! 5. Re-encode as JPEG at a fixed quality
//!
//! Compression is best-effort. Callers keep the original file whenever this
//! returns an error.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::borrow::Cow;

use super::error::{ImageError, ImageResult};
use super::types::{ImageFile, MIB};

/// Compressor settings
#[derive(Debug, Clone)]
pub struct CompressorConfig {
    /// Files at or below this size skip compression
    pub threshold_bytes: u64,
    /// Longest allowed side after resampling, in pixels
    pub max_dimension: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: MIB,
            max_dimension: 1200,
            quality: 80,
        }
    }
}

/// Downscales and re-encodes images larger than the threshold
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    config: CompressorConfig,
}

impl ImageCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Optimize an image for upload
    ///
    /// Returns `Cow::Borrowed` when the file is small enough to send as-is,
    /// otherwise a new JPEG file.
    pub fn compress<'a>(&self, file: &'a ImageFile) -> ImageResult<Cow<'a, ImageFile>> {
        if file.size() <= self.config.threshold_bytes {
            return Ok(Cow::Borrowed(file));
        }

        let decoded = image::load_from_memory(&file.bytes)
            .map_err(|e| ImageError::DecodeError(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let (target_width, target_height) =
            target_dimensions(width, height, self.config.max_dimension);

        let resized = if (target_width, target_height) == (width, height) {
            decoded
        } else {
            tracing::debug!(
                "Resizing {} from {}x{} to {}x{}",
                file.name,
                width,
                height,
                target_width,
                target_height
            );
            decoded.resize_exact(target_width, target_height, FilterType::Triangle)
        };

        // JPEG has no alpha channel
        let rgb = resized.to_rgb8();

        let mut buf = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, self.config.quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| ImageError::EncodeError(e.to_string()))?;
        }

        if buf.is_empty() {
            return Err(ImageError::EncodeError(
                "encoder produced no output".to_string(),
            ));
        }

        let optimized = ImageFile::new(jpeg_file_name(&file.name), "image/jpeg", buf);

        tracing::info!(
            "Image optimized: {:.2}MB -> {:.2}MB",
            file.size_mib(),
            optimized.size_mib()
        );

        Ok(Cow::Owned(optimized))
    }
}

/// Target size with the longer side clamped to `max_dimension`
///
/// Landscape images are clamped on width, everything else on height.
/// Images already within bounds keep their size.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = |side: u32, from: u32| -> u32 {
        let scaled = (side as f64 * max_dimension as f64 / from as f64).round() as u32;
        scaled.max(1)
    };

    if width > height && width > max_dimension {
        (max_dimension, scale(height, width))
    } else if height > max_dimension {
        (scale(width, height), max_dimension)
    } else {
        (width, height)
    }
}

/// Replace the final extension with `.jpg`
///
/// Names without an extension (no dot, or a trailing dot) are kept as-is.
pub fn jpeg_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => format!("{}.jpg", stem),
        _ => name.to_string(),
    }
}
