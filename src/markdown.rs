//! Narrative text segmentation
//!
//! The itinerary service is asked to mark section titles with double
//! asterisks (`**Title**`) and to avoid numbered lists. This module splits
//! narrative text on that convention so the surfaces can style headings and
//! body text differently. It is deliberately not a markdown parser.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// One piece of narrative text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A `**Title**`-marked section heading (markers stripped)
    Heading(String),
    /// Plain body text, verbatim
    Body(String),
}

impl Segment {
    /// Get the text content regardless of kind
    pub fn text(&self) -> &str {
        match self {
            Segment::Heading(text) => text,
            Segment::Body(text) => text,
        }
    }
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("heading pattern is valid"))
}

/// Split narrative text into heading and body segments
///
/// Body segments are verbatim slices of the input; heading segments carry
/// the text between the markers. Empty body runs between adjacent headings
/// are dropped.
pub fn segments(text: &str) -> Vec<Segment> {
    debug!(text_len = text.len(), "segments: called");
    let mut result = Vec::new();
    let mut cursor = 0;

    for captures in heading_pattern().captures_iter(text) {
        let Some(whole) = captures.get(0) else { continue };
        if whole.start() > cursor {
            result.push(Segment::Body(text[cursor..whole.start()].to_string()));
        }
        result.push(Segment::Heading(captures[1].to_string()));
        cursor = whole.end();
    }

    if cursor < text.len() {
        result.push(Segment::Body(text[cursor..].to_string()));
    }

    result
}

/// Check whether the text contains at least one marked section heading
pub fn has_heading(text: &str) -> bool {
    heading_pattern().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segments_plain_text() {
        let segs = segments("Just drive south on the 101.");
        assert_eq!(segs, vec![Segment::Body("Just drive south on the 101.".to_string())]);
    }

    #[test]
    fn test_segments_heading_and_body() {
        let segs = segments("**Cabazon Dinosaurs**\nGiant concrete dinosaurs by the freeway.");
        assert_eq!(
            segs,
            vec![
                Segment::Heading("Cabazon Dinosaurs".to_string()),
                Segment::Body("\nGiant concrete dinosaurs by the freeway.".to_string()),
            ]
        );
    }

    #[test]
    fn test_segments_multiple_sections() {
        let segs = segments("Intro.\n**First**\nbody one\n**Second**\nbody two");
        let headings: Vec<_> = segs
            .iter()
            .filter_map(|s| match s {
                Segment::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["First", "Second"]);
        assert!(matches!(&segs[0], Segment::Body(b) if b == "Intro.\n"));
    }

    #[test]
    fn test_segments_adjacent_headings_drop_empty_body() {
        let segs = segments("**One****Two**");
        assert_eq!(
            segs,
            vec![
                Segment::Heading("One".to_string()),
                Segment::Heading("Two".to_string()),
            ]
        );
    }

    #[test]
    fn test_segments_empty_input() {
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_unterminated_markers_stay_body() {
        let segs = segments("**not a heading");
        assert_eq!(segs, vec![Segment::Body("**not a heading".to_string())]);
    }

    #[test]
    fn test_has_heading() {
        assert!(has_heading("**Salvation Mountain** is a painted hill."));
        assert!(!has_heading("no sections here"));
    }

    proptest! {
        /// Reconstructing the input from its segments loses nothing
        #[test]
        fn prop_segments_roundtrip(text in ".*") {
            let rebuilt: String = segments(&text)
                .iter()
                .map(|segment| match segment {
                    Segment::Heading(h) => format!("**{}**", h),
                    Segment::Body(b) => b.clone(),
                })
                .collect();
            prop_assert_eq!(rebuilt, text);
        }
    }
}
