//! Document-level statistics for reporting

use docgraph_core::DocumentStats;

const ENGLISH_INDICATORS: &[&str] = &["the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with"];
const ACADEMIC_INDICATORS: &[&str] = &[
    "abstract",
    "introduction",
    "methodology",
    "results",
    "conclusion",
    "references",
];
const TEXTBOOK_INDICATORS: &[&str] = &["chapter", "exercise", "example", "definition", "theorem"];
const MANUAL_INDICATORS: &[&str] = &["step", "procedure", "instruction", "guide", "manual"];

fn count_mentions(text_lower: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| text_lower.contains(**term)).count()
}

/// Crude language guess: "english", "other" or "unknown"
pub fn detect_language(text: &str) -> &'static str {
    if text.is_empty() {
        return "unknown";
    }
    if count_mentions(&text.to_lowercase(), ENGLISH_INDICATORS) >= 3 {
        "english"
    } else {
        "other"
    }
}

pub fn classify_document_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if count_mentions(&lower, ACADEMIC_INDICATORS) >= 3 {
        "academic_paper"
    } else if count_mentions(&lower, TEXTBOOK_INDICATORS) >= 2 {
        "textbook"
    } else if count_mentions(&lower, MANUAL_INDICATORS) >= 2 {
        "manual"
    } else {
        "general"
    }
}

/// Reading level from average words per sentence
pub fn estimate_reading_level(text: &str) -> &'static str {
    let words = text.split_whitespace().count();
    let sentences = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    if words == 0 || sentences == 0 {
        return "unknown";
    }

    let words_per_sentence = words as f32 / sentences as f32;
    if words_per_sentence > 25.0 {
        "advanced"
    } else if words_per_sentence > 15.0 {
        "intermediate"
    } else {
        "basic"
    }
}

pub fn document_stats(text: &str, pages_processed: usize) -> DocumentStats {
    let total_words = text.split_whitespace().count();
    DocumentStats {
        total_characters: text.chars().count(),
        total_words,
        avg_words_per_page: total_words as f32 / pages_processed.max(1) as f32,
        language_detected: detect_language(text).to_string(),
        document_type: classify_document_type(text).to_string(),
        reading_level: estimate_reading_level(text).to_string(),
    }
}
