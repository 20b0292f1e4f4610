//! End-to-end tests for the extraction pipeline

use std::collections::HashSet;

use docgraph_core::{
    ConceptId, ConceptSource, ConceptType, DocumentInput, ExtractionConfig, ExtractionResult,
    PageInput, RelationKind, RelationSource, Relationship, TextSpan,
};
use docgraph_extractor::dedup::{dedup_relationships, is_near_duplicate};
use docgraph_extractor::lexicon::{is_stopword, STOPWORDS};
use docgraph_extractor::{ConceptValidator, DocumentPipeline, RejectReason};
use proptest::prelude::*;

fn pipeline() -> DocumentPipeline {
    DocumentPipeline::new(ExtractionConfig::default()).unwrap()
}

fn textbook() -> DocumentInput {
    let page1 = PageInput::new(
        1,
        "Linear Algebra\n\n\
         A vector space is defined as a set closed under addition and scalar multiplication. \
         Matrix Multiplication requires Vector Spaces and careful bookkeeping of indices. \
         The Gaussian Elimination algorithm reduces a matrix to row echelon form.\n",
    )
    .with_span(TextSpan::new("Linear Algebra", 20.0))
    .with_span(TextSpan::new(
        "A vector space is defined as a set closed under addition and scalar multiplication.",
        11.0,
    ));

    let page2 = PageInput::new(
        2,
        "Theorem 2.1: Rank Nullity Theorem\n\n\
         The Rank Nullity Theorem relates the dimension of the kernel and the image. \
         Eigenvalue Decomposition is similar to Singular Value Decomposition in practice. \
         Spectral Theory includes Eigenvalue Decomposition as a special case. \
         Important: Orthogonal Projection is used in Least Squares fitting.\n",
    )
    .with_span(TextSpan::new("Theorem 2.1: Rank Nullity Theorem", 17.0).bold());

    let page3 = PageInput::new(
        3,
        "Numerical Methods\n\n\
         Floating Point Arithmetic causes Rounding Errors in long computations. \
         Gaussian Elimination requires Pivoting Strategies for numerical stability. \
         Conditioning is related to Floating Point Arithmetic and Rounding Errors.\n",
    )
    .with_span(TextSpan::new("Numerical Methods", 18.0));

    DocumentInput::new(vec![page1, page2, page3]).with_title("Linear Algebra Notes")
}

fn concept_by_name<'a>(result: &'a ExtractionResult, needle: &str) -> Option<&'a docgraph_core::Concept> {
    result.concepts.iter().find(|c| c.name.contains(needle))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_heading_theorem_on_page_three() {
    let pages = vec![
        PageInput::new(1, "Preface text."),
        PageInput::new(2, "More preface text."),
        PageInput::new(
            3,
            "Theorem 1: Pythagorean Theorem\n\nIn a right triangle the square of the hypotenuse \
             equals the sum of the squares of the other two sides.\n",
        )
        .with_span(TextSpan::new("Theorem 1: Pythagorean Theorem", 18.0)),
    ];

    let result = pipeline().extract(&DocumentInput::new(pages));
    assert!(result.extraction_metadata.success);

    let theorem = concept_by_name(&result, "Pythagorean Theorem").expect("heading concept");
    assert_eq!(theorem.concept_type, ConceptType::Theory);
    assert_eq!(theorem.source, ConceptSource::Heading);
    assert_eq!(theorem.page, 3);
    assert!(theorem.quality_score >= 0.4);
}

#[test]
fn test_name_length_boundary() {
    let validator = ConceptValidator::new().unwrap();
    let sixty = format!("Q{}", "x".repeat(59));
    let sixty_one = format!("Q{}", "x".repeat(60));

    let accepted = validator.validate(&sixty, "");
    assert_ne!(accepted.rejection, Some(RejectReason::TooLong));

    let rejected = validator.validate(&sixty_one, "");
    assert_eq!(rejected.rejection, Some(RejectReason::TooLong));
    assert_eq!(rejected.rejection.map(|r| r.as_str()), Some("too_long"));
}

#[test]
fn test_prerequisite_between_headings() {
    let page = PageInput::new(1, "Calculus\n\nAlgebra\n\nCalculus requires Algebra fundamentals.\n")
        .with_span(TextSpan::new("Calculus", 18.0))
        .with_span(TextSpan::new("Algebra", 18.0));

    let result = pipeline().extract(&DocumentInput::new(vec![page]));
    let calculus = concept_by_name(&result, "Calculus").expect("calculus concept");
    let algebra = concept_by_name(&result, "Algebra").expect("algebra concept");

    let rel = result
        .relationships
        .iter()
        .find(|r| r.relation == RelationKind::Prerequisite)
        .expect("prerequisite relationship");
    assert_eq!(rel.from, calculus.id);
    assert_eq!(rel.to, algebra.id);
    assert_eq!(rel.source, RelationSource::Pattern);
    assert!(rel.strength >= 0.6);
}

#[test]
fn test_empty_document() {
    let result = pipeline().extract(&DocumentInput::new(Vec::new()));
    assert!(result.concepts.is_empty());
    assert!(result.relationships.is_empty());
    assert_eq!(result.graph.stats.total_nodes, 0);
    assert!(!result.extraction_metadata.success);
    assert!(result.extraction_metadata.error.is_some());
}

#[test]
fn test_limit_and_limits_collapse() {
    let text = "Limit\n\nLimits\n\n".to_string()
        + &"The Limit of a sequence and Limits of functions behave alike. ".repeat(6);
    let page = PageInput::new(1, text)
        .with_span(TextSpan::new("Limit", 18.0))
        .with_span(TextSpan::new("Limits", 18.0));

    let result = pipeline().extract(&DocumentInput::new(vec![page]));
    let limits: Vec<_> = result
        .concepts
        .iter()
        .filter(|c| matches!(c.name.to_lowercase().as_str(), "limit" | "limits"))
        .collect();
    assert_eq!(limits.len(), 1);
    assert!(result.extraction_metadata.stats.near_duplicates_skipped >= 1);
    assert!(result.relationships.iter().all(|r| r.from != r.to));
}

#[test]
fn test_headingless_document_gets_fallback_section() {
    let page = PageInput::new(
        1,
        "plain running text without any structure, written as one long lowercase paragraph.",
    );
    let result = pipeline().extract(&DocumentInput::new(vec![page]));

    assert!(result.extraction_metadata.success);
    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.sections[0].title, "Document Content");
    assert_eq!(result.sections[0].page, 1);
    assert!(result.sections[0].content.contains("plain running text"));
    assert_eq!(result.extraction_metadata.stats.headings_found, 0);
}

/// Distinct two-word pseudo names that never share a token or substring
fn pseudo_name(i: usize) -> String {
    const SYLLABLES: [&str; 10] = ["ba", "ke", "di", "lo", "mu", "ra", "se", "ti", "vo", "zu"];
    let (h, t, u) = (SYLLABLES[i / 100 % 10], SYLLABLES[i / 10 % 10], SYLLABLES[i % 10]);
    format!("Zo{h}{t}{u} Ka{u}{t}{h}")
}

#[test]
fn test_raw_candidate_cap_bounds_concepts() {
    let pages: Vec<PageInput> = (0..4)
        .map(|p| {
            let names: Vec<String> = (p * 50..(p + 1) * 50).map(pseudo_name).collect();
            let text: String = names
                .iter()
                .map(|name| format!("{name}\nA short paragraph follows here.\n\n"))
                .collect();
            names.iter().fold(PageInput::new(p as u32 + 1, text), |page, name| {
                page.with_span(TextSpan::new(name.as_str(), 18.0))
            })
        })
        .collect();

    let result = pipeline().extract(&DocumentInput::new(pages));
    let stats = &result.extraction_metadata.stats;
    assert_eq!(stats.headings_found, 200);
    assert_eq!(stats.raw_candidates, 150);
    assert_eq!(result.concepts.len(), 80);
}

// ============================================================================
// Output properties
// ============================================================================

#[test]
fn test_concept_invariants() {
    let result = pipeline().extract(&textbook());
    assert!(result.extraction_metadata.success);
    assert!(!result.concepts.is_empty());

    for concept in &result.concepts {
        let len = concept.name.chars().count();
        assert!((2..=60).contains(&len), "bad length: {}", concept.name);
        assert!(!is_stopword(&concept.name.to_lowercase()));
        assert!(concept.quality_score >= concept.concept_type.acceptance_threshold());
    }

    for (i, a) in result.concepts.iter().enumerate() {
        for b in &result.concepts[i + 1..] {
            assert!(
                !is_near_duplicate(&a.name, &b.name),
                "near duplicates survived: {} / {}",
                a.name,
                b.name
            );
        }
    }
}

#[test]
fn test_relationship_invariants() {
    let result = pipeline().extract(&textbook());
    let ids: HashSet<ConceptId> = result.concepts.iter().map(|c| c.id).collect();

    for rel in &result.relationships {
        assert!(ids.contains(&rel.from));
        assert!(ids.contains(&rel.to));
        assert_ne!(rel.from, rel.to);
        assert!((0.3..=1.0).contains(&rel.strength), "strength {}", rel.strength);
    }

    let mut seen = HashSet::new();
    for rel in &result.relationships {
        let key = (rel.from.min(rel.to), rel.from.max(rel.to), rel.relation);
        assert!(seen.insert(key), "reverse duplicate for {:?}", key);
    }
}

#[test]
fn test_graph_mirrors_concepts() {
    let result = pipeline().extract(&textbook());
    assert_eq!(result.graph.nodes.len(), result.concepts.len());
    assert!(result.graph.edges.len() <= result.relationships.len().min(100));
    assert_eq!(result.graph.stats.total_nodes, result.concepts.len());
    assert_eq!(
        result.extraction_metadata.stats.concepts_extracted,
        result.concepts.len()
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let doc = textbook();
    let pipeline = pipeline();
    let first = pipeline.extract(&doc);
    let second = pipeline.extract(&doc);

    assert_eq!(first.concepts, second.concepts);
    assert_eq!(first.relationships, second.relationships);
    assert_eq!(first.sections, second.sections);
    assert_eq!(
        first.extraction_metadata.stats,
        second.extraction_metadata.stats
    );
}

#[test]
fn test_failed_page_does_not_abort() {
    let mut broken = PageInput::new(2, "unreadable");
    broken.error = Some("bad xref table".to_string());
    let mut doc = textbook();
    doc.pages.insert(1, broken);

    let result = pipeline().extract(&doc);
    let stats = &result.extraction_metadata.stats;
    assert!(result.extraction_metadata.success);
    assert_eq!(stats.pages_total, 4);
    assert_eq!(stats.pages_skipped, 1);
    assert_eq!(stats.skipped_pages, vec![2]);
    assert_eq!(stats.pages_processed, 3);
}

#[test]
fn test_result_serializes() {
    let result = pipeline().extract(&textbook());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["extraction_metadata"]["success"], true);
    assert!(json["graph"]["stats"]["type_distribution"].is_object());
    assert!(json["concepts"].as_array().is_some_and(|c| !c.is_empty()));
}

// ============================================================================
// Property tests
// ============================================================================

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn relationship_strategy() -> impl Strategy<Value = Relationship> {
    (0u32..6, 0u32..6, 0usize..RelationKind::ALL.len(), 0.3f32..=1.0).prop_map(
        |(from, to, kind, strength)| Relationship {
            from: ConceptId(from),
            to: ConceptId(to),
            relation: RelationKind::ALL[kind],
            strength,
            source: RelationSource::Pattern,
            context: String::new(),
        },
    )
}

proptest! {
    #[test]
    fn prop_accepted_names_are_bounded(raw in "[A-Z][a-z]{0,40}( [A-Z][a-z]{0,12}){0,4}") {
        let validator = ConceptValidator::new().unwrap();
        let result = validator.validate(&raw, "");
        if result.is_valid() {
            let len = result.cleaned_name.chars().count();
            prop_assert!((2..=60).contains(&len));
            prop_assert!(!is_stopword(&result.cleaned_name.to_lowercase()));
            prop_assert!(result.score >= result.concept_type.acceptance_threshold());
        } else {
            prop_assert!(result.score <= result.concept_type.acceptance_threshold());
        }
    }

    #[test]
    fn prop_overlong_single_words_rejected(raw in "[A-Z][a-z]{60,90}") {
        let validator = ConceptValidator::new().unwrap();
        prop_assert_eq!(validator.validate(&raw, "").rejection, Some(RejectReason::TooLong));
    }

    #[test]
    fn prop_stopwords_rejected(word in prop::sample::select(STOPWORDS.to_vec())) {
        prop_assume!(word.len() >= 2);
        let validator = ConceptValidator::new().unwrap();
        let result = validator.validate(&capitalize(word), "some context");
        prop_assert_eq!(result.rejection, Some(RejectReason::ForbiddenWord));
    }

    #[test]
    fn prop_dedup_relationships(
        rels in prop::collection::vec(relationship_strategy(), 0..40),
        cap in 1usize..30,
    ) {
        let kept = dedup_relationships(rels.clone(), cap);
        prop_assert!(kept.len() <= cap);
        prop_assert!(kept.windows(2).all(|w| w[0].strength >= w[1].strength));

        let mut seen = HashSet::new();
        for rel in &kept {
            let key = (rel.from.min(rel.to), rel.from.max(rel.to), rel.relation);
            prop_assert!(seen.insert(key));
            prop_assert!(rels.contains(rel));
        }
    }
}
