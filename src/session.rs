//! Reading session
//!
//! Holds the state of one palm-reader view for as long as it lives: the
//! selected image, the progress indicator, the last reading and the last
//! error message. Nothing here is persisted.
//!
//! Flow:
//! 1. `select_image` validates and optimizes the photo on the blocking pool
//! 2. `analyze` uploads it while the progress ticker runs
//! 3. the reading (or the user-facing error) is stored on the session
//! 4. `reset` clears everything for the next palm

use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

use crate::analysis::{AnalysisError, PalmAnalyzer, ProgressConfig, ProgressTicker};
use crate::reading::PalmReading;
use crate::upload::{self, ImageCompressor, ImageError, ImageFile, ImageValidator};

/// State of one palm-reader view
pub struct ReadingSession<A: PalmAnalyzer> {
    analyzer: A,
    validator: ImageValidator,
    compressor: ImageCompressor,
    progress_config: ProgressConfig,
    progress: Arc<watch::Sender<u8>>,
    selected: Option<ImageFile>,
    reading: Option<PalmReading>,
    error: Option<String>,
}

impl<A: PalmAnalyzer> ReadingSession<A> {
    /// Create a session with default upload limits and progress timing
    pub fn new(analyzer: A) -> Self {
        Self::with_parts(
            analyzer,
            ImageValidator::default(),
            ImageCompressor::default(),
            ProgressConfig::default(),
        )
    }

    /// Create a session from explicit components
    pub fn with_parts(
        analyzer: A,
        validator: ImageValidator,
        compressor: ImageCompressor,
        progress_config: ProgressConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(0u8);
        Self {
            analyzer,
            validator,
            compressor,
            progress_config,
            progress: Arc::new(tx),
            selected: None,
            reading: None,
            error: None,
        }
    }

    /// The analyzer this session submits to
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Image that will be submitted by `analyze`
    pub fn selected_image(&self) -> Option<&ImageFile> {
        self.selected.as_ref()
    }

    /// Last successful reading
    pub fn reading(&self) -> Option<&PalmReading> {
        self.reading.as_ref()
    }

    /// Last user-facing error message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Subscribe to the progress indicator (0-100)
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Validate and optimize a newly selected image
    ///
    /// On a validation failure the previous selection is kept and the
    /// message is recorded as the session error.
    pub async fn select_image(&mut self, file: ImageFile) -> Result<&ImageFile, ImageError> {
        tracing::debug!("Selected {} ({} bytes, {})", file.name, file.size(), file.mime_type);

        match upload::prepare_in_background(&self.validator, &self.compressor, file).await {
            Ok(prepared) => {
                self.error = None;
                Ok(self.selected.insert(prepared))
            }
            Err(e) => {
                tracing::info!("Image rejected: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit the selected image and store the outcome
    pub async fn analyze(&mut self) -> Result<&PalmReading, AnalysisError> {
        let Some(image) = self.selected.as_ref() else {
            return Err(AnalysisError::NoImageSelected);
        };

        self.error = None;

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id, image = %image.name);

        let ticker = ProgressTicker::start(Arc::clone(&self.progress), &self.progress_config);
        let outcome = self.analyzer.analyze(image).instrument(span.clone()).await;
        let done = ticker.complete();

        let _enter = span.enter();
        let result = match outcome {
            Ok(result) => {
                let reading = PalmReading::new(result);
                tracing::info!("Reading received with {} sections", reading.sections.len());
                Ok(&*self.reading.insert(reading))
            }
            Err(e) => {
                tracing::warn!("Analysis failed: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        };

        done.reset();
        result
    }

    /// Forget the image, reading and error ("Read Another Palm")
    pub fn reset(&mut self) {
        self.selected = None;
        self.reading = None;
        self.error = None;
        self.progress.send_replace(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const READING: &str = "🖐️ Overall Impression\nYour palm is broad, with a deep and unbroken life line.\n\n\
                           💼 Career & Wealth\nYou are drawn to work where you can lead and build.";

    /// Returns canned outcomes and records what it was sent
    struct StubAnalyzer {
        outcome: fn() -> Result<AnalysisResult, AnalysisError>,
        seen: Mutex<Vec<String>>,
    }

    impl StubAnalyzer {
        fn new(outcome: fn() -> Result<AnalysisResult, AnalysisError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PalmAnalyzer for StubAnalyzer {
        async fn analyze(&self, image: &ImageFile) -> Result<AnalysisResult, AnalysisError> {
            self.seen.lock().unwrap().push(image.name.clone());
            (self.outcome)()
        }
    }

    fn success() -> Result<AnalysisResult, AnalysisError> {
        Ok(AnalysisResult {
            text: READING.to_string(),
            audio_url: String::new(),
        })
    }

    fn rate_limited() -> Result<AnalysisResult, AnalysisError> {
        Err(AnalysisError::RateLimited)
    }

    fn palm() -> ImageFile {
        ImageFile::new("palm.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    #[tokio::test]
    async fn test_analyze_without_image() {
        let mut session = ReadingSession::new(StubAnalyzer::new(success));
        let err = session.analyze().await.unwrap_err();
        assert!(matches!(err, AnalysisError::NoImageSelected));
        assert!(session.analyzer().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_reading() {
        let mut session = ReadingSession::new(StubAnalyzer::new(success));
        session.select_image(palm()).await.unwrap();

        let reading = session.analyze().await.unwrap();
        assert_eq!(reading.sections.len(), 2);
        assert_eq!(reading.sections[1].title, "Career & Wealth");

        assert!(session.error().is_none());
        assert_eq!(*session.progress().borrow(), 0);
        assert_eq!(session.analyzer().seen.lock().unwrap().as_slice(), ["palm.jpg"]);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_message() {
        let mut session = ReadingSession::new(StubAnalyzer::new(rate_limited));
        session.select_image(palm()).await.unwrap();

        let err = session.analyze().await.unwrap_err();
        assert!(matches!(err, AnalysisError::RateLimited));
        assert_eq!(
            session.error(),
            Some("Too many requests. Please wait a minute before trying again.")
        );
        assert!(session.reading().is_none());
        assert_eq!(*session.progress().borrow(), 0);
    }

    #[tokio::test]
    async fn test_invalid_selection_keeps_previous_image() {
        let mut session = ReadingSession::new(StubAnalyzer::new(success));
        session.select_image(palm()).await.unwrap();

        let err = session
            .select_image(ImageFile::new("notes.txt", "text/plain", b"hi".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::InvalidType { .. }));
        assert_eq!(session.error(), Some("Please select an image file (JPG or PNG)"));
        assert_eq!(session.selected_image().map(|i| i.name.as_str()), Some("palm.jpg"));

        // A valid selection clears the error
        session.select_image(palm()).await.unwrap();
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_selection_is_optimized() {
        use crate::upload::CompressorConfig;
        use image::{DynamicImage, ImageFormat, RgbImage};
        use std::io::Cursor;

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(900, 2400, image::Rgb([90, 60, 40])))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let mut session = ReadingSession::with_parts(
            StubAnalyzer::new(success),
            ImageValidator::default(),
            ImageCompressor::new(CompressorConfig {
                threshold_bytes: 0,
                ..CompressorConfig::default()
            }),
            ProgressConfig::default(),
        );

        let selected = session
            .select_image(ImageFile::new("hand.png", "image/png", png))
            .await
            .unwrap();
        assert_eq!(selected.name, "hand.jpg");

        let decoded = image::load_from_memory(&selected.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (450, 1200));
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let mut session = ReadingSession::new(StubAnalyzer::new(success));
        session.select_image(palm()).await.unwrap();
        session.analyze().await.unwrap();

        session.reset();
        assert!(session.selected_image().is_none());
        assert!(session.reading().is_none());
        assert!(session.error().is_none());
    }
}
