//! Sharing helpers for a finished reading

use super::parser::FortuneSection;

/// Title used when sharing a reading
pub const SHARE_TITLE: &str = "My Palm Reading Analysis";

/// Markers the service puts in its closing call-to-action paragraph
const SHARE_MARKERS: [&str; 2] = ["Share your palm reading", "mystiview.com"];

/// Whether a section is the service's "share your reading" prompt
pub fn is_share_section(section: &FortuneSection) -> bool {
    SHARE_MARKERS
        .iter()
        .any(|marker| section.content.contains(marker))
}

/// Text offered to the share sheet or copied to the clipboard
pub fn share_text(url: &str) -> String {
    format!("Check out my palm reading analysis! {}", url)
}

/// Anchor id for a section: lowercase title, whitespace runs become `-`
pub fn section_anchor(title: &str, index: usize) -> String {
    if title.is_empty() {
        return format!("section-{}", index);
    }

    let lowered = title.to_lowercase();
    let mut anchor = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                anchor.push('-');
            }
            in_whitespace = true;
        } else {
            anchor.push(c);
            in_whitespace = false;
        }
    }

    anchor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_section_detection() {
        let share = FortuneSection::new(
            "✨",
            "Share",
            "Share your palm reading with friends at mystiview.com!",
        );
        assert!(is_share_section(&share));

        let link_only = FortuneSection::new("🔗", "Visit", "Find more at mystiview.com");
        assert!(is_share_section(&link_only));

        let career = FortuneSection::new("💼", "Career", "You are a natural leader.");
        assert!(!is_share_section(&career));
    }

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text("https://mystiview.com/"),
            "Check out my palm reading analysis! https://mystiview.com/"
        );
    }

    #[test]
    fn test_section_anchor() {
        assert_eq!(section_anchor("Hidden Talents", 0), "hidden-talents");
        assert_eq!(section_anchor("Career &  Wealth", 2), "career-&-wealth");
        assert_eq!(section_anchor("Personality", 3), "personality");
        assert_eq!(section_anchor("", 4), "section-4");
    }
}
