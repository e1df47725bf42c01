//! Analysis error types
//!
//! The `Display` text of every variant is what the user gets to see.

use thiserror::Error;

pub const INVALID_IMAGE_MESSAGE: &str = "Invalid image. Please try another.";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Something went wrong with the analysis. Please try another image.";

/// Errors that can occur while getting a reading from the analysis service
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Server rejected the image (HTTP 400)
    #[error("{0}")]
    BadImage(String),

    /// Too many requests (HTTP 429)
    #[error("Too many requests. Please wait a minute before trying again.")]
    RateLimited,

    /// Any other non-success status
    #[error("Server error: {status}")]
    ServerError { status: u16 },

    /// Server answered but reported `status: "error"`
    #[error("{0}")]
    AnalysisFailed(String),

    /// Reading text missing or under the minimum length
    #[error("The reading was incomplete. Please try uploading a clearer image of your palm.")]
    IncompleteReading,

    /// Analysis requested before an image was selected
    #[error("Please select a palm image first.")]
    NoImageSelected,

    /// Request timed out
    #[error("The palm reading service took too long to respond. Please try again.")]
    Timeout,

    /// Could not connect to the service
    #[error("Could not reach the palm reading service. Please try again.")]
    Unavailable,

    /// Other transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Success status with a body that is not the expected JSON
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl AnalysisError {
    /// Classify a transport error the way the client reports it
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout
        } else if err.is_connect() {
            AnalysisError::Unavailable
        } else {
            AnalysisError::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AnalysisError::RateLimited.to_string(),
            "Too many requests. Please wait a minute before trying again."
        );
        assert_eq!(
            AnalysisError::ServerError { status: 502 }.to_string(),
            "Server error: 502"
        );
        assert_eq!(
            AnalysisError::BadImage("no palm detected".into()).to_string(),
            "no palm detected"
        );
        assert_eq!(
            AnalysisError::IncompleteReading.to_string(),
            "The reading was incomplete. Please try uploading a clearer image of your palm."
        );
    }
}
