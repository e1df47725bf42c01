//! # MystiView
//!
//! AI palm reading client - prepares a palm photo, sends it to the palm
//! reading API, and splits the returned reading into fortune sections.
//!
//! ## Features
//!
//! - **Upload validation**: only images, at most 10 MiB
//! - **Client-side optimization**: large photos are downscaled to 1200px and
//!   re-encoded as JPEG, falling back to the original on failure
//! - **Typed outcomes**: every HTTP/JSON response maps to a result or a
//!   user-facing error
//! - **Section parsing**: emoji-titled paragraphs become ordered sections
//!
//! ## Modules
//!
//! - [`upload`]: Validation and compression of selected images
//! - [`analysis`]: Remote analysis client and progress ticker
//! - [`reading`]: Section parser and sharing helpers
//! - [`session`]: Per-view state driving the whole pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mystiview::{AnalysisClient, AnalysisClientConfig, ImageFile, ReadingSession};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalysisClient::new(AnalysisClientConfig::default())?;
//!     let mut session = ReadingSession::new(client);
//!
//!     let photo = ImageFile::from_path(Path::new("palm.jpg")).await?;
//!     session.select_image(photo).await?;
//!
//!     let reading = session.analyze().await?;
//!     for section in &reading.sections {
//!         println!("{} {}\n{}\n", section.icon, section.title, section.content);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod reading;
pub mod session;
pub mod upload;

// Re-export top-level types for convenience
pub use analysis::{
    interpret_response, AnalysisClient, AnalysisClientConfig, AnalysisError, AnalysisResult,
    PalmAnalyzer, ProgressConfig, ProgressTicker,
};

pub use reading::{
    is_share_section, parse_sections, section_anchor, share_text, FortuneSection, PalmReading,
    FALLBACK_ICON,
};

pub use session::ReadingSession;

pub use upload::{
    prepare, prepare_in_background, CompressorConfig, ImageCompressor, ImageError, ImageFile, ImageValidator,
};

pub use config::{ApiConfig, Config, ConfigError, ImageConfig, LoggingConfig};
