//! Analysis request/response types

use serde::{Deserialize, Serialize};

/// Minimum number of characters a reading must have to be accepted
pub const MIN_READING_CHARS: usize = 100;

/// A successful reading from the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Full reading text, at least `MIN_READING_CHARS` long
    pub text: String,
    /// Narrated audio location, empty when the service produced none
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

// ============================================
// Wire DTOs
// ============================================

/// Body of a 2xx response
#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "audioUrl")]
    pub audio_url: Option<String>,
}

/// Body of a 400 response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}
