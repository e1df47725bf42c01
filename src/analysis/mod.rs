//! Remote palm analysis
//!
//! Talks to the palm reading API and interprets its responses.
//!
//! ## Architecture
//!
//! - **PalmAnalyzer**: seam between the reading session and whatever
//!   produces readings
//! - **AnalysisClient**: the HTTP implementation (`POST /api/analyze-palm`)
//! - **ProgressTicker**: time-based progress while a request is in flight

mod client;
mod error;
mod progress;
mod types;

pub use client::{interpret_response, AnalysisClient, AnalysisClientConfig, ANALYZE_PATH, IMAGE_FIELD};
pub use error::{AnalysisError, ANALYSIS_FAILED_MESSAGE, INVALID_IMAGE_MESSAGE};
pub use progress::{next_progress, ProgressConfig, ProgressDone, ProgressTicker};
pub use types::{AnalysisResult, MIN_READING_CHARS};

use async_trait::async_trait;

use crate::upload::ImageFile;

/// Anything that can turn a palm photo into a reading
#[async_trait]
pub trait PalmAnalyzer: Send + Sync {
    /// Submit one image and wait for the outcome
    async fn analyze(&self, image: &ImageFile) -> Result<AnalysisResult, AnalysisError>;
}
