//! Palm analysis REST client
//!
//! Uploads a palm photo as multipart form data and turns the HTTP status
//! and JSON body into an `AnalysisResult` or a typed `AnalysisError`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::error::{AnalysisError, ANALYSIS_FAILED_MESSAGE, INVALID_IMAGE_MESSAGE};
use super::types::{AnalysisResult, AnalyzeResponse, ErrorDetail, MIN_READING_CHARS};
use super::PalmAnalyzer;
use crate::upload::ImageFile;

/// Path of the analysis endpoint, relative to the base URL
pub const ANALYZE_PATH: &str = "/api/analyze-palm";

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Configuration for the analysis client
#[derive(Debug, Clone)]
pub struct AnalysisClientConfig {
    /// Base URL of the palm reading API (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 60_000,
        }
    }
}

/// Palm analysis REST client
pub struct AnalysisClient {
    client: Client,
    config: AnalysisClientConfig,
}

impl AnalysisClient {
    /// Create a new client with the given configuration
    pub fn new(config: AnalysisClientConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AnalysisError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &AnalysisClientConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Full URL of the analysis endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url(), ANALYZE_PATH)
    }

    /// Make a server-relative audio URL absolute
    ///
    /// Returns `None` when the service produced no audio.
    pub fn resolve_audio_url(&self, audio_url: &str) -> Option<String> {
        if audio_url.is_empty() {
            None
        } else if audio_url.starts_with('/') {
            Some(format!("{}{}", self.base_url(), audio_url))
        } else {
            Some(audio_url.to_string())
        }
    }

    /// Upload an image and wait for the reading
    pub async fn analyze_image(&self, image: &ImageFile) -> Result<AnalysisResult, AnalysisError> {
        let url = self.endpoint();

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        tracing::debug!("POST {} ({} bytes, {})", url, image.size(), image.mime_type);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(AnalysisError::from_transport)?;

        let status = response.status();
        tracing::debug!("Analysis service responded with {}", status);

        // Error bodies are only mined for a detail message
        let body = if status.is_success() {
            response.text().await.map_err(AnalysisError::from_transport)?
        } else {
            response.text().await.unwrap_or_default()
        };

        interpret_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl PalmAnalyzer for AnalysisClient {
    async fn analyze(&self, image: &ImageFile) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_image(image).await
    }
}

/// Map a status code and response body to an outcome
pub fn interpret_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisError> {
    if !(200..300).contains(&status) {
        return Err(match status {
            400 => {
                let detail = serde_json::from_str::<ErrorDetail>(body)
                    .ok()
                    .and_then(|d| d.detail)
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| INVALID_IMAGE_MESSAGE.to_string());
                AnalysisError::BadImage(detail)
            }
            429 => AnalysisError::RateLimited,
            status => AnalysisError::ServerError { status },
        });
    }

    let data: AnalyzeResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

    if data.status.as_deref() == Some("error") {
        let message = data
            .text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string());
        return Err(AnalysisError::AnalysisFailed(message));
    }

    let text = match data.text {
        Some(text) if text.chars().count() >= MIN_READING_CHARS => text,
        _ => return Err(AnalysisError::IncompleteReading),
    };

    Ok(AnalysisResult {
        text,
        audio_url: data.audio_url.unwrap_or_default(),
    })
}
