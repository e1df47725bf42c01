//! Palm reading results
//!
//! Turns the analysis text into ordered fortune sections and provides the
//! helpers used to present and share them.

mod parser;
mod share;

pub use parser::{parse_sections, FortuneSection, FALLBACK_ICON};
pub use share::{is_share_section, section_anchor, share_text, SHARE_TITLE};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::AnalysisResult;

/// A successful reading together with its parsed sections
#[derive(Debug, Clone, Serialize)]
pub struct PalmReading {
    /// Raw result from the analysis service
    pub result: AnalysisResult,
    /// Sections in the order they appear in the text
    pub sections: Vec<FortuneSection>,
    /// When the reading was received
    pub received_at: DateTime<Utc>,
}

impl PalmReading {
    /// Parse a result into a reading
    pub fn new(result: AnalysisResult) -> Self {
        let sections = parse_sections(&result.text);
        Self {
            result,
            sections,
            received_at: Utc::now(),
        }
    }

    /// Whether the service attached narrated audio
    pub fn has_audio(&self) -> bool {
        !self.result.audio_url.is_empty()
    }

    /// Sections that carry reading content (share prompts excluded)
    pub fn fortune_sections(&self) -> impl Iterator<Item = &FortuneSection> {
        self.sections.iter().filter(|s| !is_share_section(s))
    }
}
