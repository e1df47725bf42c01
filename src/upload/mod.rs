//! Upload preparation
//!
//! Everything that happens to a palm photo before it leaves the machine.
//!
//! ## Stages
//!
//! - **Validator**: rejects non-image content types and files over 10 MiB
//! - **Compressor**: downsizes and re-encodes files over 1 MiB as JPEG
//!
//! `prepare` runs both. Compression failures fall back to the validated
//! original. Async callers use `prepare_in_background`, which keeps the
//! decode and encode work off the runtime's worker threads.

mod compressor;
mod error;
mod types;
mod validator;

pub use compressor::{jpeg_file_name, target_dimensions, CompressorConfig, ImageCompressor};
pub use error::{ImageError, ImageResult};
pub use types::{mime_type_for_path, ImageFile, MIB, UNKNOWN_MIME_TYPE};
pub use validator::{ImageValidator, DEFAULT_MAX_UPLOAD_BYTES};

use std::borrow::Cow;
use std::sync::Arc;

/// Compressed variant of a file, or `None` when the original should be sent
fn compressed_variant(compressor: &ImageCompressor, file: &ImageFile) -> Option<ImageFile> {
    match compressor.compress(file) {
        Ok(Cow::Owned(optimized)) => Some(optimized),
        Ok(Cow::Borrowed(_)) => None,
        Err(e) => {
            tracing::warn!("Error optimizing image {}: {} (using original)", file.name, e);
            None
        }
    }
}

/// Validate a file, then compress it when worthwhile
///
/// Only validation errors are returned. A failed compression is logged and
/// the original file is used instead.
pub fn prepare(
    validator: &ImageValidator,
    compressor: &ImageCompressor,
    file: ImageFile,
) -> ImageResult<ImageFile> {
    let file = validator.validate(file)?;
    Ok(compressed_variant(compressor, &file).unwrap_or(file))
}

/// Same as [`prepare`], with decoding and encoding on the blocking pool
///
/// A compression task that dies also falls back to the original.
pub async fn prepare_in_background(
    validator: &ImageValidator,
    compressor: &ImageCompressor,
    file: ImageFile,
) -> ImageResult<ImageFile> {
    let file = Arc::new(validator.validate(file)?);

    let compressor = compressor.clone();
    let task_file = Arc::clone(&file);
    let compressed =
        tokio::task::spawn_blocking(move || compressed_variant(&compressor, &task_file)).await;

    let optimized = match compressed {
        Ok(optimized) => optimized,
        Err(e) => {
            tracing::warn!("Image optimization task failed: {} (using original)", e);
            None
        }
    };

    Ok(optimized.unwrap_or_else(|| {
        Arc::try_unwrap(file).unwrap_or_else(|shared| ImageFile::clone(&shared))
    }))
}
