//! Concept candidate generation
//!
//! Candidates come from section titles and from the pattern table applied to
//! overlapping word windows of each page. Iteration order is fixed: titles in
//! section order, then pages in page order, windows in window order, patterns
//! in table order and matches in text order.

use regex::{Captures, Regex};

use crate::compile_pattern;
use crate::patterns::{ConceptPattern, PatternKind, PatternTable};
use crate::text::{slice_around, word_windows};
use docgraph_core::{CandidateConfig, DocGraphError, Result, Section};

/// Titles that are references rather than concepts
const NON_CONCEPT_TITLE: &str = r"(?i)^(?:Chapter|Section|Part|Figure|Table|Page)\s+\d+";

/// Where a candidate came from
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOrigin {
    Heading {
        level: u8,
    },
    Pattern {
        index: usize,
        kind: PatternKind,
        weight: f32,
        /// Position of the word window within its page
        window: usize,
    },
}

/// Raw concept name with provenance, consumed by the validator
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptCandidate {
    pub raw_name: String,
    /// Text the candidate is scored against: section body or match surroundings
    pub context: String,
    pub page: u32,
    pub origin: CandidateOrigin,
}

pub struct CandidateGenerator {
    config: CandidateConfig,
    patterns: PatternTable,
    non_concept_title: Regex,
}

impl CandidateGenerator {
    pub fn new(config: CandidateConfig) -> Result<Self> {
        Ok(Self {
            config,
            patterns: PatternTable::new()?,
            non_concept_title: compile_pattern(NON_CONCEPT_TITLE)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_patterns(config: CandidateConfig, patterns: PatternTable) -> Result<Self> {
        Ok(Self {
            patterns,
            ..Self::new(config)?
        })
    }

    /// Candidate for a section title, `None` for reference-like or long titles
    pub fn heading_candidate(&self, section: &Section) -> Option<ConceptCandidate> {
        let title = section.title.trim();
        if self.non_concept_title.is_match(title) {
            return None;
        }
        if title.split_whitespace().count() > self.config.max_heading_words {
            return None;
        }

        Some(ConceptCandidate {
            raw_name: title.to_string(),
            context: section.content.clone(),
            page: section.page,
            origin: CandidateOrigin::Heading {
                level: section.level,
            },
        })
    }

    /// Overlapping word windows of a page; short pages yield none
    pub fn page_windows(&self, page_text: &str) -> Vec<String> {
        if page_text.trim().chars().count() < self.config.min_page_chars {
            return Vec::new();
        }
        word_windows(page_text, self.config.window_words)
    }

    /// Lazily apply every pattern to one window.
    ///
    /// A match without a usable first group yields `MalformedMatch` and the
    /// scan continues with the next match.
    pub fn window_candidates<'a>(
        &'a self,
        window: &'a str,
        page: u32,
        window_index: usize,
    ) -> impl Iterator<Item = Result<ConceptCandidate>> + 'a {
        self.patterns.iter().flat_map(move |pattern| {
            pattern
                .regex
                .captures_iter(window)
                .map(move |caps| self.candidate_from_match(pattern, &caps, window, page, window_index))
        })
    }

    fn candidate_from_match(
        &self,
        pattern: &ConceptPattern,
        caps: &Captures<'_>,
        window: &str,
        page: u32,
        window_index: usize,
    ) -> Result<ConceptCandidate> {
        let malformed = |reason: &str| DocGraphError::MalformedMatch {
            pattern: pattern.index,
            reason: reason.to_string(),
        };

        let whole = caps.get(0).ok_or_else(|| malformed("no match span"))?;
        let name = caps
            .get(1)
            .map(|m| m.as_str().trim())
            .ok_or_else(|| malformed("missing capture group"))?;
        if name.is_empty() {
            return Err(malformed("empty capture group"));
        }

        Ok(ConceptCandidate {
            raw_name: name.to_string(),
            context: slice_around(window, whole.start(), whole.end(), self.config.context_chars)
                .to_string(),
            page,
            origin: CandidateOrigin::Pattern {
                index: pattern.index,
                kind: pattern.kind,
                weight: pattern.weight,
                window: window_index,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CandidateGenerator {
        CandidateGenerator::new(CandidateConfig::default()).unwrap()
    }

    #[test]
    fn test_heading_candidates_filtered() {
        let g = generator();
        let keep = Section::new("Pythagorean Theorem", "body", 3, 2);
        let reference = Section::new("Figure 3 overview", "", 1, 2);
        let long = Section::new("one two three four five six seven eight nine", "", 1, 2);

        let candidate = g.heading_candidate(&keep).unwrap();
        assert_eq!(candidate.raw_name, "Pythagorean Theorem");
        assert_eq!(candidate.page, 3);
        assert_eq!(candidate.origin, CandidateOrigin::Heading { level: 2 });
        assert!(g.heading_candidate(&reference).is_none());
        assert!(g.heading_candidate(&long).is_none());
    }

    #[test]
    fn test_short_pages_have_no_windows() {
        let g = generator();
        assert!(g.page_windows("too short").is_empty());
        assert_eq!(g.page_windows(&"word ".repeat(50)).len(), 1);
    }

    #[test]
    fn test_window_candidates_in_table_order() {
        let g = generator();
        let window = "Definition: Vector Space.\nWe use **Gradient Descent** often.";
        let candidates: Vec<_> = g
            .window_candidates(window, 2, 1)
            .filter_map(|c| c.ok())
            .collect();

        let names: Vec<&str> = candidates.iter().map(|c| c.raw_name.as_str()).collect();
        let definition = names.iter().position(|n| *n == "Vector Space").unwrap();
        let emphasis = names.iter().position(|n| *n == "Gradient Descent").unwrap();
        assert!(definition < emphasis);

        let first = &candidates[definition];
        assert_eq!(first.page, 2);
        assert!(first.context.contains("Definition: Vector Space"));
        assert!(matches!(
            first.origin,
            CandidateOrigin::Pattern { index: 0, window: 1, .. }
        ));
    }
}
