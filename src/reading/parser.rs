//! Reading text parser
//!
//! Splits the reading returned by the analysis service into fortune
//! sections. The service writes one paragraph per topic, each starting with
//! an emoji and a title:
//!
//! ```text
//! 🖐️ Overall Impression
//! Your palm shows...
//!
//! ❤️ Relationships & Emotions
//! You love deeply...
//! ```
//!
//! Parsing never fails. Malformed paragraphs are dropped or get the
//! fallback icon.
//!
//! An icon is usually one code point, but a U+FE0F presentation selector
//! that follows the glyph is kept with it, so `❤️` arrives as two code
//! points and the title never starts with an invisible character.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Icon used when a title line does not start with a pictograph
pub const FALLBACK_ICON: &str = "✨";

/// One topic of a reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneSection {
    pub icon: String,
    pub title: String,
    pub content: String,
}

impl FortuneSection {
    pub fn new(
        icon: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            icon: icon.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Leading pictograph (misc symbols & pictographs through supplemental
/// symbols, misc symbols, dingbats), its optional emoji presentation
/// selector, then the title.
fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^([\x{1F300}-\x{1F9FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}]\x{FE0F}?)\s*(.+)$")
                .ok()
        })
        .as_ref()
}

/// Split a title line into icon and title
fn split_title(line: &str) -> (String, String) {
    let line = line.trim();

    if let Some(caps) = title_pattern().and_then(|re| re.captures(line)) {
        return (caps[1].to_string(), caps[2].trim().to_string());
    }

    (FALLBACK_ICON.to_string(), line.to_string())
}

/// Parse reading text into sections, in source order
pub fn parse_sections(text: &str) -> Vec<FortuneSection> {
    let normalized = text.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| {
            let lines: Vec<&str> = block
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .collect();

            let (title_line, content_lines) = lines.split_first()?;
            if content_lines.is_empty() {
                return None;
            }

            let (icon, title) = split_title(title_line);
            let content = content_lines.join(" ").trim().to_string();

            Some(FortuneSection {
                icon,
                title,
                content,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_section_with_icon() {
        let sections = parse_sections("✨ Love\nYou will find love soon.");
        assert_eq!(
            sections,
            vec![FortuneSection::new("✨", "Love", "You will find love soon.")]
        );
    }

    #[test]
    fn test_fallback_icon() {
        let sections = parse_sections("Love\nYou will find love soon.");
        assert_eq!(
            sections,
            vec![FortuneSection::new(FALLBACK_ICON, "Love", "You will find love soon.")]
        );
    }

    #[test]
    fn test_single_line_block_dropped() {
        assert!(parse_sections("🔮 Your palm holds many secrets.").is_empty());

        let sections = parse_sections("Intro only\n\n💼 Career & Wealth\nLeadership suits you.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Career & Wealth");
    }

    #[test]
    fn test_full_reading_in_order() {
        let text = "\u{1F590}\u{FE0F} Overall Impression\nYour palm is broad and steady.\nThe lines are deep.\n\n\
                    \u{2764}\u{FE0F} Relationships & Emotions\nYou love with your whole heart.\n\n\
                    💼 Career & Wealth\nYou are a natural leader.\n\n\
                    🧠 Personality Traits\nCurious and patient.\n\n\
                    ✨ Hidden Talents\nYou have a gift for music.";

        let sections = parse_sections(text);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Overall Impression",
                "Relationships & Emotions",
                "Career & Wealth",
                "Personality Traits",
                "Hidden Talents"
            ]
        );

        assert_eq!(sections[0].icon, "\u{1F590}\u{FE0F}");
        assert_eq!(sections[1].icon, "\u{2764}\u{FE0F}");
        assert_eq!(sections[2].icon, "💼");
        assert_eq!(sections[3].icon, "🧠");
        assert_eq!(sections[0].content, "Your palm is broad and steady. The lines are deep.");
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let text = "\n\n  \u{2600}\u{FE0F}   Sun Line  \n   \n  Success comes late.  \n\n\n\n";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].icon, "\u{2600}\u{FE0F}");
        assert_eq!(sections[0].title, "Sun Line");
        assert_eq!(sections[0].content, "Success comes late.");
    }

    #[test]
    fn test_crlf_input() {
        let text = "🌙 Moon\r\nIntuition runs deep.\r\n\r\n🌟 Star\r\nLuck follows you.";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].content, "Intuition runs deep.");
        assert_eq!(sections[1].icon, "🌟");
    }

    #[test]
    fn test_glyph_outside_ranges_uses_fallback() {
        // U+1FA84 (magic wand) is outside the recognised ranges
        let sections = parse_sections("🪄 Magic\nSomething special.");
        assert_eq!(sections[0].icon, FALLBACK_ICON);
        assert_eq!(sections[0].title, "🪄 Magic");
    }

    #[test]
    fn test_glyph_without_title_uses_fallback() {
        let sections = parse_sections("🔮\nThe stars are unclear.");
        assert_eq!(sections[0].icon, FALLBACK_ICON);
        assert_eq!(sections[0].title, "🔮");
    }

    #[test]
    fn test_numbered_title_keeps_number() {
        let sections = parse_sections("1. \u{1F590}\u{FE0F} Overall Impression\nBroad palm.");
        assert_eq!(sections[0].icon, FALLBACK_ICON);
        assert_eq!(sections[0].title, "1. \u{1F590}\u{FE0F} Overall Impression");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_sections("").is_empty());
        assert!(parse_sections("\n\n\n").is_empty());
    }
}
