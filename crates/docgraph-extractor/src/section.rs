//! Section classification from page text and span layout
//!
//! A span becomes a section heading when any structural, font or layout
//! rule fires. The section body is the page text following the heading up
//! to the next heading-like break.

use regex::Regex;
use tracing::debug;

use crate::compile_pattern;
use crate::text::{collapse_whitespace, floor_char_boundary, preview, truncate_chars};
use docgraph_core::{DocGraphError, PageInput, Result, Section, SectionConfig, TextSpan};

/// Structural heading patterns, matched case-insensitively at span start
const HEADING_PATTERNS: &[&str] = &[
    r"^(?:Chapter|Section|Part)\s+\d+",
    r"^\d+\.?\d*\s+[A-Z]",
    r"^(?:Introduction|Conclusion|Summary|Abstract|References|Bibliography)$",
    r"^(?:Definition|Theorem|Lemma|Proof|Example|Exercise)(?:\s+\d+)?$",
    r"^\d+\.\d+(?:\.\d+)?\s+[A-Z]",
];

/// Title-case or all-caps words only
const TITLE_LINE_PATTERN: &str = r"^[A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*$";
const TITLE_LINE_MAX_CHARS: usize = 60;

/// Where the body of a section stops
const NEXT_HEADING_PATTERNS: &[&str] = &[
    r"\n\n[A-Z][A-Za-z\s]{5,50}\n",
    r"\n\d+\.?\d*\s+[A-Z]",
    r"\n(?:Chapter|Section)\s+\d+",
];

const HEADING_FONT_HINTS: &[&str] = &["bold", "heavy", "black", "title", "heading"];

const MIN_SPAN_CHARS: usize = 3;
const SHORT_BOLD_MAX_CHARS: usize = 80;
const SHORT_BOLD_MAX_SPACES: usize = 8;
const ISOLATED_MAX_CHARS: usize = 60;
const ISOLATION_PROBE_BYTES: usize = 50;

/// Font size bands for heading levels 1-4; anything smaller is level 5
const LEVEL_BANDS: [(f32, u8); 4] = [(20.0, 1), (16.0, 2), (14.0, 3), (12.0, 4)];

/// Turns a page's spans into `Section` records
pub struct SectionClassifier {
    config: SectionConfig,
    heading_patterns: Vec<Regex>,
    title_line: Regex,
    next_heading: Vec<Regex>,
}

impl SectionClassifier {
    pub fn new(config: SectionConfig) -> Result<Self> {
        Ok(Self {
            config,
            heading_patterns: HEADING_PATTERNS
                .iter()
                .map(|p| compile_pattern(&format!("(?i){p}")))
                .collect::<Result<_>>()?,
            title_line: compile_pattern(TITLE_LINE_PATTERN)?,
            next_heading: NEXT_HEADING_PATTERNS
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<_>>()?,
        })
    }

    /// Whether a trimmed span reads as a heading on this page
    pub fn is_heading(&self, text: &str, span: &TextSpan, page_text: &str) -> bool {
        let char_count = text.chars().count();
        if char_count > self.config.max_heading_chars {
            return false;
        }

        if self.heading_patterns.iter().any(|re| re.is_match(text)) {
            return true;
        }
        if char_count <= TITLE_LINE_MAX_CHARS && self.title_line.is_match(text) {
            return true;
        }

        if span.font_size > self.config.large_font_size {
            return true;
        }
        if span.font_size > self.config.medium_font_size && span.is_bold {
            return true;
        }

        let font_name = span.font_name.to_lowercase();
        if HEADING_FONT_HINTS.iter().any(|hint| font_name.contains(hint)) {
            return true;
        }

        if span.is_bold
            && char_count < SHORT_BOLD_MAX_CHARS
            && !text.ends_with('.')
            && !text.starts_with('•')
            && text.matches(' ').count() < SHORT_BOLD_MAX_SPACES
        {
            return true;
        }

        char_count < ISOLATED_MAX_CHARS && is_isolated(text, page_text)
    }

    /// Coarse heading level from the font size band
    pub fn heading_level(&self, span: &TextSpan) -> u8 {
        LEVEL_BANDS
            .iter()
            .find(|(min_size, _)| span.font_size > *min_size)
            .map(|(_, level)| *level)
            .unwrap_or_else(|| {
                if span.is_bold && span.font_name.to_lowercase().contains("bold") {
                    4
                } else {
                    5
                }
            })
    }

    /// Page text after `title`, up to the next heading-like break
    pub fn section_content(&self, page_text: &str, title: &str) -> String {
        let Some(title_pos) = page_text.find(title) else {
            return String::new();
        };
        let remaining = &page_text[title_pos + title.len()..];

        let end = self
            .next_heading
            .iter()
            .filter_map(|re| re.find(remaining).map(|m| m.start()))
            .fold(remaining.len(), usize::min);
        collapse_whitespace(truncate_chars(&remaining[..end], self.config.content_char_cap))
    }

    /// Classify every span on a page.
    ///
    /// Fails when the parser flagged the page or its layout is unusable; the
    /// caller records the page as skipped.
    pub fn classify_page(&self, page: &PageInput) -> Result<Vec<Section>> {
        if let Some(reason) = &page.error {
            return Err(DocGraphError::PageFailed {
                page: page.number,
                reason: reason.clone(),
            });
        }
        if let Some(span) = page
            .spans
            .iter()
            .find(|s| !s.font_size.is_finite() || s.font_size < 0.0)
        {
            return Err(DocGraphError::PageFailed {
                page: page.number,
                reason: format!("invalid font size {} for span {:?}", span.font_size, span.text),
            });
        }

        let mut sections = Vec::new();
        for span in &page.spans {
            let text = span.text.trim();
            if text.chars().count() < MIN_SPAN_CHARS {
                continue;
            }
            if !self.is_heading(text, span, &page.text) {
                continue;
            }

            let content = self.section_content(&page.text, text);
            let mut section = Section::new(text, content, page.number, self.heading_level(span));
            section.font_size = span.font_size;
            section.is_bold = span.is_bold;
            sections.push(section);
        }

        debug!(page = page.number, sections = sections.len(), "Classified page");
        Ok(sections)
    }

    /// Synthetic section used when no heading was found anywhere
    pub fn fallback_section(&self, full_text: &str) -> Section {
        Section::new(
            "Document Content",
            preview(full_text, self.config.fallback_content_chars),
            1,
            1,
        )
    }
}

/// Preceded by a blank line and followed by a line break
fn is_isolated(text: &str, page_text: &str) -> bool {
    let Some(pos) = page_text.find(text) else {
        return false;
    };
    if pos == 0 {
        return false;
    }

    let before_start = floor_char_boundary(page_text, pos.saturating_sub(ISOLATION_PROBE_BYTES));
    let after_start = pos + text.len();
    let after_end = floor_char_boundary(page_text, after_start + ISOLATION_PROBE_BYTES);

    page_text[before_start..pos].contains("\n\n") && page_text[after_start..after_end].contains('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SectionClassifier {
        SectionClassifier::new(SectionConfig::default()).unwrap()
    }

    #[test]
    fn test_structural_headings() {
        let c = classifier();
        let span = TextSpan::new("", 11.0);
        assert!(c.is_heading("Chapter 3", &span, ""));
        assert!(c.is_heading("2.1 Vector spaces", &span, ""));
        assert!(c.is_heading("Theorem 4", &span, ""));
        assert!(c.is_heading("Linear Algebra", &span, ""));
        assert!(!c.is_heading("this is just running text, nothing more.", &span, ""));
    }

    #[test]
    fn test_font_rules() {
        let c = classifier();
        let body = "the quick brown fox jumps over it.";
        assert!(c.is_heading(body, &TextSpan::new(body, 18.0), ""));
        assert!(c.is_heading(body, &TextSpan::new(body, 15.0).bold(), ""));
        assert!(!c.is_heading(body, &TextSpan::new(body, 15.0), ""));
        assert!(c.is_heading(body, &TextSpan::new(body, 11.0).with_font("Times-Heavy"), ""));
    }

    #[test]
    fn test_short_bold_rule() {
        let c = classifier();
        let span = TextSpan::new("", 11.0).bold();
        assert!(c.is_heading("some bold lead-in", &span, ""));
        assert!(!c.is_heading("some bold sentence.", &span, ""));
        assert!(!c.is_heading("• bullet item", &span, ""));
    }

    #[test]
    fn test_isolated_line() {
        let c = classifier();
        let page = "running text above\n\nnumerical stability\nmore running text";
        let span = TextSpan::new("", 11.0);
        assert!(c.is_heading("numerical stability", &span, page));
        assert!(!c.is_heading("running text above", &span, page));
    }

    #[test]
    fn test_heading_levels() {
        let c = classifier();
        assert_eq!(c.heading_level(&TextSpan::new("", 24.0)), 1);
        assert_eq!(c.heading_level(&TextSpan::new("", 18.0)), 2);
        assert_eq!(c.heading_level(&TextSpan::new("", 15.0)), 3);
        assert_eq!(c.heading_level(&TextSpan::new("", 13.0)), 4);
        assert_eq!(
            c.heading_level(&TextSpan::new("", 11.0).bold().with_font("Arial-Bold")),
            4
        );
        assert_eq!(c.heading_level(&TextSpan::new("", 11.0).bold()), 5);
    }

    #[test]
    fn test_section_content_stops_at_next_heading() {
        let c = classifier();
        let page = "Limits\nA limit describes behaviour near a point.\n2 Derivatives\nmore";
        assert_eq!(
            c.section_content(page, "Limits"),
            "A limit describes behaviour near a point."
        );
        assert_eq!(c.section_content(page, "Missing"), "");
    }

    #[test]
    fn test_section_content_capped() {
        let c = classifier();
        let page = format!("Title {}", "word ".repeat(1000));
        let content = c.section_content(&page, "Title");
        assert!(content.len() <= 2000);
    }

    #[test]
    fn test_section_content_cap_counts_characters() {
        let c = classifier();
        let page = format!("Títle{}", "é".repeat(3000));
        let content = c.section_content(&page, "Títle");
        assert_eq!(content.chars().count(), 2000);
    }

    #[test]
    fn test_classify_page() {
        let c = classifier();
        let page = PageInput::new(3, "Theorem 1: Pythagorean Theorem\nIn a right triangle the squares add up.")
            .with_span(TextSpan::new("Theorem 1: Pythagorean Theorem", 18.0))
            .with_span(TextSpan::new("In a right triangle the squares add up.", 11.0))
            .with_span(TextSpan::new("ab", 30.0));
        let sections = c.classify_page(&page).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Theorem 1: Pythagorean Theorem");
        assert_eq!(sections[0].page, 3);
        assert_eq!(sections[0].level, 2);
        assert_eq!(sections[0].content, "In a right triangle the squares add up.");
    }

    #[test]
    fn test_classify_page_failures() {
        let c = classifier();
        let mut flagged = PageInput::new(2, "text");
        flagged.error = Some("corrupt content stream".to_string());
        assert!(matches!(
            c.classify_page(&flagged),
            Err(DocGraphError::PageFailed { page: 2, .. })
        ));

        let bad_font = PageInput::new(4, "text").with_span(TextSpan::new("Heading", f32::NAN));
        assert!(c.classify_page(&bad_font).is_err());
    }

    #[test]
    fn test_fallback_section() {
        let c = classifier();
        let text = "x".repeat(1500);
        let section = c.fallback_section(&text);
        assert_eq!(section.title, "Document Content");
        assert_eq!(section.content.len(), 1003);
        assert_eq!(section.level, 1);
    }
}
