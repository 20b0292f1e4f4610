//! Concept extraction patterns
//!
//! The table order is part of the extraction contract: patterns are applied
//! to each window in table order and concept ids are handed out in that order.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compile_pattern;
use docgraph_core::Result;

/// Family of an extraction pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Definition,
    KeyConcept,
    Theorem,
    Principle,
    NamedTheorem,
    Algorithm,
    Method,
    MethodApplication,
    Formula,
    Mathematical,
    Structure,
    Importance,
    Learning,
    Introduction,
    Emphasis,
    Parenthetical,
    Enumeration,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::KeyConcept => "key_concept",
            Self::Theorem => "theorem",
            Self::Principle => "principle",
            Self::NamedTheorem => "named_theorem",
            Self::Algorithm => "algorithm",
            Self::Method => "method",
            Self::MethodApplication => "method_application",
            Self::Formula => "formula",
            Self::Mathematical => "mathematical",
            Self::Structure => "structure",
            Self::Importance => "importance",
            Self::Learning => "learning",
            Self::Introduction => "introduction",
            Self::Emphasis => "emphasis",
            Self::Parenthetical => "parenthetical",
            Self::Enumeration => "enumeration",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of one pattern. The first capture group is the name.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub kind: PatternKind,
    pub regex: &'static str,
    /// Importance weight of matches, 0.3 - 0.95
    pub weight: f32,
}

const fn spec(kind: PatternKind, regex: &'static str, weight: f32) -> PatternSpec {
    PatternSpec {
        kind,
        regex,
        weight,
    }
}

/// Ordered pattern table, all applied case-insensitively in multi-line mode
pub const CONCEPT_PATTERNS: &[PatternSpec] = &[
    // Definitions and formal concepts
    spec(
        PatternKind::Definition,
        r"(?:Definition|Define|Def\.?)[:\s]+([A-Z][a-zA-Z\s]{2,40}?)(?:\.|:|;|\n)",
        0.9,
    ),
    spec(
        PatternKind::Definition,
        r"\b([A-Z][a-zA-Z\s]{2,30}?)\s+is\s+(?:defined\s+as|a\s+type\s+of|an?\s+(?:important|key|fundamental|basic|essential))",
        0.9,
    ),
    spec(
        PatternKind::KeyConcept,
        r"(?:The\s+concept\s+of\s+|Key\s+concept[:\s]+)([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.8,
    ),
    // Theorems and principles
    spec(
        PatternKind::Theorem,
        r"(?:Theorem|Lemma|Corollary|Proposition)[:\s]*(?:\d+(?:\.\d+)*[:.]?\s*)?([A-Z][a-zA-Z\s]{2,40}?)(?:\.|:|;|\n)",
        0.95,
    ),
    spec(
        PatternKind::Principle,
        r"(?:Principle|Law)\s+of\s+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.9,
    ),
    spec(
        PatternKind::NamedTheorem,
        r"([A-Z][a-zA-Z\s]{2,30}?)(?:'s)?\s+(?:Theorem|Principle|Law|Rule)(?:\.|:|;|\n)",
        0.85,
    ),
    // Methods and algorithms
    spec(
        PatternKind::Algorithm,
        r"(?:Algorithm|Method|Technique|Approach)[:\s]+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.8,
    ),
    spec(
        PatternKind::Method,
        r"([A-Z][a-zA-Z\s]{2,30}?)\s+(?:algorithm|method|technique|approach|procedure)(?:\.|:|;|\n)",
        0.75,
    ),
    spec(
        PatternKind::MethodApplication,
        r"(?:The\s+)?([A-Z][a-zA-Z\s]{2,30}?)\s+(?:method|algorithm)\s+(?:is|works|involves)",
        0.7,
    ),
    // Mathematical concepts
    spec(
        PatternKind::Formula,
        r"(?:Formula|Equation)[:\s]+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.8,
    ),
    spec(
        PatternKind::Mathematical,
        r"([A-Z][a-zA-Z\s]{2,30}?)\s+(?:formula|equation|function|variable)(?:\.|:|;|\n)",
        0.75,
    ),
    // Academic structures
    spec(
        PatternKind::Structure,
        r"(?:Chapter|Section)\s+\d+[:.]?\s*([A-Z][a-zA-Z\s]{2,40}?)(?:\n|\.|$)",
        0.6,
    ),
    spec(
        PatternKind::Structure,
        r"^\s*\d+\.?\d*\s+([A-Z][a-zA-Z\s]{2,40}?)(?:\n|\.|$)",
        0.5,
    ),
    // Important terms
    spec(
        PatternKind::Importance,
        r"(?:Important|Key|Essential|Fundamental|Basic|Core)[:\s]+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.7,
    ),
    spec(
        PatternKind::Importance,
        r"([A-Z][a-zA-Z\s]{2,30}?)\s+(?:is\s+(?:important|essential|fundamental|crucial|vital))",
        0.6,
    ),
    // Learning objectives
    spec(
        PatternKind::Learning,
        r"(?:Learn|Study|Understand|Master)[:\s]+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.5,
    ),
    spec(
        PatternKind::Introduction,
        r"(?:Introduction\s+to|Overview\s+of)\s+([A-Z][a-zA-Z\s]{2,30}?)(?:\.|:|;|\n)",
        0.5,
    ),
    // Emphasis markers left in the text by the parser
    spec(PatternKind::Emphasis, r"\*\*([A-Z][a-zA-Z\s]{2,30}?)\*\*", 0.6),
    spec(PatternKind::Emphasis, r"__([A-Z][a-zA-Z\s]{2,30}?)__", 0.6),
    // Parenthetical definitions
    spec(
        PatternKind::Parenthetical,
        r"([A-Z][a-zA-Z\s]{2,30}?)\s*\([^)]{10,100}\)",
        0.4,
    ),
    // Lists and enumerations
    spec(
        PatternKind::Enumeration,
        r"(?:•|\*|-|\d+\.)\s*([A-Z][a-zA-Z\s]{2,30}?)(?::|\.|\n)",
        0.3,
    ),
];

/// A compiled entry of the pattern table
#[derive(Debug, Clone)]
pub struct ConceptPattern {
    /// Position in `CONCEPT_PATTERNS`
    pub index: usize,
    pub kind: PatternKind,
    pub weight: f32,
    pub regex: Regex,
}

/// Compiled, ordered concept pattern table
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<ConceptPattern>,
}

impl PatternTable {
    /// Compile the default table
    pub fn new() -> Result<Self> {
        Self::from_specs(CONCEPT_PATTERNS)
    }

    /// Compile a custom table
    pub fn from_specs(specs: &[PatternSpec]) -> Result<Self> {
        let patterns = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Ok(ConceptPattern {
                    index,
                    kind: spec.kind,
                    weight: spec.weight,
                    regex: compile_pattern(&format!("(?im){}", spec.regex))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConceptPattern> {
        self.patterns.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ConceptPattern> {
        self.patterns.get(index)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
