//! Concept validation and quality scoring
//!
//! A candidate is normalized, run through hard reject rules, scored on a
//! continuous [0, 1] scale and classified. Acceptance depends on the
//! type-specific threshold from `ConceptType::acceptance_threshold`.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compile_pattern;
use crate::lexicon::{self, ACADEMIC_CONTEXT_INDICATORS, HIGH_VALUE_TERMS, MEDIUM_VALUE_TERMS};
use docgraph_core::{ConceptType, Result};

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 60;
const MAX_STOPWORD_RATIO: f32 = 0.6;

/// Patterns that reject a candidate outright
const FORBIDDEN_PATTERNS: &[&str] = &[
    r"^\d+$",
    r"^[^a-zA-Z]*$",
    r"https?://",
    r"@",
    r"^\W+$",
    r"\d{4,}",
    r"^(?:Figure|Fig|Table|Equation|Eq)\s*\d+",
    r"^(?:Page|P\.)\s*\d+",
    r"^\w{1,2}$",
];

/// Patterns every candidate must match
const REQUIRED_PATTERNS: &[&str] = &[r"^[A-Z]", r"[a-zA-Z]{2,}"];

/// Why a candidate was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TooShort,
    TooLong,
    ForbiddenWord,
    ForbiddenPattern,
    MissingRequiredPattern,
    TooManyCommonWords,
    LowQuality,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::ForbiddenWord => "forbidden_word",
            Self::ForbiddenPattern => "forbidden_pattern",
            Self::MissingRequiredPattern => "missing_required_pattern",
            Self::TooManyCommonWords => "too_many_common_words",
            Self::LowQuality => "low_quality",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub cleaned_name: String,
    pub score: f32,
    pub concept_type: ConceptType,
    pub rejection: Option<RejectReason>,
}

impl Validation {
    fn rejected(cleaned_name: String, reason: RejectReason) -> Self {
        Self {
            cleaned_name,
            score: 0.0,
            concept_type: ConceptType::Concept,
            rejection: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Rule-based concept validator
pub struct ConceptValidator {
    leading_article: Regex,
    generic_suffix: Regex,
    forbidden: Vec<Regex>,
    required: Vec<Regex>,
    title_case: Regex,
    all_caps: Regex,
    greek: Regex,
    acronym: Regex,
    named_law: Regex,
}

impl ConceptValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            leading_article: compile_pattern(r"(?i)^(?:The\s+|A\s+|An\s+)")?,
            generic_suffix: compile_pattern(
                r"(?i)\s+(?:Method|Algorithm|Approach|Technique|Theory|Model)$",
            )?,
            forbidden: FORBIDDEN_PATTERNS
                .iter()
                .map(|p| compile_pattern(&format!("(?i){p}")))
                .collect::<Result<_>>()?,
            required: REQUIRED_PATTERNS
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<_>>()?,
            title_case: compile_pattern(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*$")?,
            all_caps: compile_pattern(r"^[A-Z]+(?:\s+[A-Z]+)*$")?,
            greek: compile_pattern(r"[α-ωΑ-Ω]")?,
            acronym: compile_pattern(r"\b[A-Z]{2,4}\b")?,
            named_law: compile_pattern(
                r"\b[A-Z][a-z]+(?:'s)?\s+(?:Theorem|Law|Principle|Method|Algorithm)",
            )?,
        })
    }

    /// Strip leading articles and trailing generic suffixes
    pub fn normalize(&self, raw: &str) -> String {
        let name = raw.trim();
        let name = self.leading_article.replace(name, "");
        let name = self.generic_suffix.replace(&name, "");
        name.trim().to_string()
    }

    /// Validate a raw candidate against its surrounding text
    pub fn validate(&self, raw: &str, context: &str) -> Validation {
        let name = self.normalize(raw);
        let char_count = name.chars().count();

        if char_count < MIN_NAME_CHARS {
            return Validation::rejected(name, RejectReason::TooShort);
        }
        if char_count > MAX_NAME_CHARS {
            return Validation::rejected(name, RejectReason::TooLong);
        }

        let lower = name.to_lowercase();
        if lexicon::is_stopword(&lower) {
            return Validation::rejected(name, RejectReason::ForbiddenWord);
        }
        if self.forbidden.iter().any(|re| re.is_match(&name)) {
            return Validation::rejected(name, RejectReason::ForbiddenPattern);
        }
        if !self.required.iter().all(|re| re.is_match(&name)) {
            return Validation::rejected(name, RejectReason::MissingRequiredPattern);
        }

        let words: Vec<&str> = lower.split_whitespace().collect();
        let stopwords = words.iter().filter(|w| lexicon::is_stopword(w)).count();
        if stopwords as f32 / words.len().max(1) as f32 > MAX_STOPWORD_RATIO {
            return Validation::rejected(name, RejectReason::TooManyCommonWords);
        }

        let score = self.score(&name, context);
        let concept_type = lexicon::classify(&lower);
        let rejection = (score < concept_type.acceptance_threshold()).then_some(RejectReason::LowQuality);

        Validation {
            cleaned_name: name,
            score,
            concept_type,
            rejection,
        }
    }

    /// Continuous quality score in [0, 1], starting from 0.5
    pub fn score(&self, name: &str, context: &str) -> f32 {
        let mut score = 0.5_f32;
        let lower = name.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        // Vocabulary membership, strongest tier only
        let high_value = lexicon::mentions_any(&lower, HIGH_VALUE_TERMS);
        let domain = lexicon::domain_of(&lower).is_some();
        if high_value {
            score += 0.4;
        } else if lexicon::mentions_any(&lower, MEDIUM_VALUE_TERMS) {
            score += 0.25;
        } else if domain {
            score += 0.2;
        }

        // Word-count shaping
        match words.len() {
            1 if high_value || domain => score += 0.1,
            1 => score -= 0.2,
            2..=4 => score += 0.15,
            n if n > 6 => score -= 0.1,
            _ => {}
        }

        if self.title_case.is_match(name) {
            score += 0.15;
        } else if self.all_caps.is_match(name) {
            score += 0.05;
        }

        if !context.is_empty() {
            let context_lower = context.to_lowercase();
            let present = words.iter().filter(|w| context_lower.contains(*w)).count();
            if present > 0 {
                score += 0.1 * (present as f32 / words.len() as f32);
            }
            if lexicon::mentions_any(&context_lower, ACADEMIC_CONTEXT_INDICATORS) {
                score += 0.1;
            }
        }

        let distinct: HashSet<&str> = words.iter().copied().collect();
        let generic = distinct.iter().filter(|w| lexicon::is_generic_word(w)).count();
        score -= 0.15 * generic as f32;

        if self.greek.is_match(name) {
            score += 0.2;
        }
        if self.acronym.is_match(name) {
            score += 0.1;
        }
        if self.named_law.is_match(name) {
            score += 0.3;
        }

        score.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
