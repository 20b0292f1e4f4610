//! Vocabularies driving concept scoring and classification
//!
//! Kept as plain data so the weights and word lists can be tested
//! independently of extraction.

use docgraph_core::ConceptType;

// ============================================================================
// Stopwords and generic words
// ============================================================================

/// Words that are never concepts on their own
pub const STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "this", "that",
    "these", "those", "a", "an", "is", "are", "was", "were", "page", "figure", "table", "chapter",
    "section", "example", "exercise", "problem", "solution", "answer", "question", "note",
    "remark", "comment", "see", "also", "can", "will", "may", "should", "would", "could", "must",
    "have", "has", "had", "do", "does", "did", "get", "got", "make", "made", "take", "took",
    "give", "gave", "put", "set", "use", "used", "find", "found",
];

/// Words that weaken a candidate, each occurrence costs a penalty
pub const GENERIC_WORDS: &[&str] = &[
    "thing", "stuff", "item", "part", "way", "time", "place", "work", "system", "process",
    "method", "approach", "technique", "strategy", "solution", "problem", "issue", "aspect",
    "factor", "element",
];

/// Structural terms dropped during post-processing
pub const GENERIC_STRUCTURAL_TERMS: &[&str] = &[
    "introduction", "overview", "summary", "conclusion", "discussion", "background",
    "motivation", "objective", "goal", "purpose", "result", "results", "finding", "findings",
    "observation", "analysis", "evaluation", "assessment", "review", "study",
];

// ============================================================================
// Academic vocabularies
// ============================================================================

pub const HIGH_VALUE_TERMS: &[&str] = &[
    "theorem", "principle", "law", "theory", "model", "algorithm", "method", "formula",
    "equation", "function", "concept", "definition", "axiom", "lemma", "corollary",
    "proposition", "hypothesis", "conjecture",
];

pub const MEDIUM_VALUE_TERMS: &[&str] = &[
    "approach", "technique", "framework", "system", "process", "procedure", "strategy",
    "mechanism", "structure", "pattern", "property", "characteristic", "feature", "aspect",
    "element", "component", "factor", "parameter",
];

/// Subject areas with their own domain vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectArea {
    Mathematics,
    Physics,
    ComputerScience,
    Chemistry,
    Biology,
    Economics,
    Psychology,
}

/// Domain vocabulary, indexed by `SubjectArea as usize`
const DOMAIN_TERMS: [&[&str]; 7] = [
    &[
        "calculus", "algebra", "geometry", "statistics", "probability", "topology", "analysis",
        "differential", "integral", "matrix", "vector", "polynomial",
    ],
    &[
        "mechanics", "thermodynamics", "electromagnetism", "quantum", "relativity", "energy",
        "force", "momentum", "acceleration", "velocity", "frequency",
    ],
    &[
        "programming", "software", "hardware", "database", "network", "security", "artificial",
        "intelligence", "machine", "learning", "data", "structure",
    ],
    &["molecular", "atomic", "chemical", "reaction", "compound", "element"],
    &["cellular", "genetic", "evolution", "organism", "protein", "enzyme"],
    &["market", "economic", "financial", "investment", "capital", "revenue"],
    &["cognitive", "behavioral", "psychological", "mental", "emotional"],
];

impl SubjectArea {
    pub const ALL: [SubjectArea; 7] = [
        Self::Mathematics,
        Self::Physics,
        Self::ComputerScience,
        Self::Chemistry,
        Self::Biology,
        Self::Economics,
        Self::Psychology,
    ];

    pub fn terms(&self) -> &'static [&'static str] {
        DOMAIN_TERMS[*self as usize]
    }
}

/// Words in a match context that mark academic prose
pub const ACADEMIC_CONTEXT_INDICATORS: &[&str] = &[
    "definition", "theorem", "principle", "method", "algorithm", "theory", "model", "concept",
    "approach", "technique",
];

/// Words near a relation phrase that strengthen the relationship
pub const RELATION_CONTEXT_INDICATORS: &[&str] = &[
    "definition", "theorem", "proof", "example", "application", "method", "algorithm",
    "principle", "theory", "model",
];

/// Type indicators in priority order, first match wins
pub const TYPE_INDICATORS: &[(ConceptType, &[&str])] = &[
    (
        ConceptType::Topic,
        &["introduction", "overview", "chapter", "part", "section"],
    ),
    (
        ConceptType::Theory,
        &["theorem", "principle", "law", "theory", "model"],
    ),
    (
        ConceptType::Method,
        &["algorithm", "method", "technique", "approach", "procedure"],
    ),
    (
        ConceptType::Mathematical,
        &["equation", "formula", "function", "variable", "constant"],
    ),
];

// ============================================================================
// Lookups
// ============================================================================

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_generic_word(word: &str) -> bool {
    GENERIC_WORDS.contains(&word)
}

pub fn is_generic_structural_term(name_lower: &str) -> bool {
    GENERIC_STRUCTURAL_TERMS.contains(&name_lower)
}

/// Whether any term occurs as a substring of `text_lower`
pub fn mentions_any(text_lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text_lower.contains(term))
}

/// Subject area whose vocabulary occurs in `text_lower`, in declaration order
pub fn domain_of(text_lower: &str) -> Option<SubjectArea> {
    SubjectArea::ALL
        .iter()
        .copied()
        .find(|area| mentions_any(text_lower, area.terms()))
}

/// Classify a concept name; falls back to `ConceptType::Concept`
pub fn classify(name_lower: &str) -> ConceptType {
    TYPE_INDICATORS
        .iter()
        .find(|(_, indicators)| mentions_any(name_lower, indicators))
        .map(|(concept_type, _)| *concept_type)
        .unwrap_or(ConceptType::Concept)
}
