//! Post-processing filters and diversity-preserving selection

use std::collections::HashSet;

use docgraph_core::{Concept, ConceptId, ConceptType};

use crate::lexicon::is_generic_structural_term;

const SHORT_WORD_CHARS: usize = 4;
const SHORT_WORD_MIN_QUALITY: f32 = 0.8;
const MIN_QUALITY: f32 = 0.25;

/// Reason a concept is dropped after acceptance, if any
pub fn quality_filter(concept: &Concept) -> Option<&'static str> {
    let name = concept.name.as_str();
    if is_generic_structural_term(&name.to_lowercase()) {
        return Some("generic_term");
    }
    if name.split_whitespace().count() == 1
        && name.chars().count() < SHORT_WORD_CHARS
        && concept.quality_score < SHORT_WORD_MIN_QUALITY
    {
        return Some("short_single_word");
    }
    if concept.quality_score < MIN_QUALITY {
        return Some("very_low_quality");
    }
    None
}

/// Stable sort by `quality_score * importance`, best first
pub fn rank(concepts: &mut [Concept]) {
    concepts.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
}

/// Cap a ranked concept list while keeping every type represented.
///
/// Each type gets `cap / number_of_types` slots filled from its own ranking;
/// leftover slots go to the best remaining concepts overall.
pub fn select_diverse(ranked: Vec<Concept>, cap: usize) -> Vec<Concept> {
    if ranked.len() <= cap {
        return ranked;
    }

    // Types in order of first appearance in the ranking
    let mut types: Vec<ConceptType> = Vec::new();
    for concept in &ranked {
        if !types.contains(&concept.concept_type) {
            types.push(concept.concept_type);
        }
    }
    let per_type = cap / types.len().max(1);

    let mut chosen: HashSet<ConceptId> = HashSet::new();
    for concept_type in &types {
        chosen.extend(
            ranked
                .iter()
                .filter(|c| c.concept_type == *concept_type)
                .take(per_type)
                .map(|c| c.id),
        );
    }

    let missing = cap.saturating_sub(chosen.len());
    let fill: Vec<ConceptId> = ranked
        .iter()
        .filter(|c| !chosen.contains(&c.id))
        .take(missing)
        .map(|c| c.id)
        .collect();
    chosen.extend(fill);

    let mut selected: Vec<Concept> = ranked.into_iter().filter(|c| chosen.contains(&c.id)).collect();
    selected.truncate(cap);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgraph_core::{ConceptSource, Confidence};

    fn concept(id: u32, name: &str, concept_type: ConceptType, quality: f32, importance: f32) -> Concept {
        Concept {
            id: ConceptId(id),
            name: name.to_string(),
            concept_type,
            page: 1,
            description: String::new(),
            importance,
            quality_score: quality,
            confidence: Confidence::from_score(quality),
            source: ConceptSource::Pattern,
            extraction_method: "pattern_0".to_string(),
            pattern_kind: None,
            context: String::new(),
        }
    }

    #[test]
    fn test_quality_filters() {
        assert_eq!(
            quality_filter(&concept(0, "Summary", ConceptType::Concept, 0.9, 1.0)),
            Some("generic_term")
        );
        assert_eq!(
            quality_filter(&concept(0, "Set", ConceptType::Concept, 0.5, 1.0)),
            Some("short_single_word")
        );
        assert_eq!(quality_filter(&concept(0, "Set", ConceptType::Concept, 0.85, 1.0)), None);
        assert_eq!(
            quality_filter(&concept(0, "Hilbert Space", ConceptType::Concept, 0.2, 1.0)),
            Some("very_low_quality")
        );
        assert_eq!(quality_filter(&concept(0, "Hilbert Space", ConceptType::Concept, 0.6, 1.0)), None);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut concepts = vec![
            concept(0, "A", ConceptType::Concept, 0.5, 0.5),
            concept(1, "B", ConceptType::Concept, 0.9, 0.9),
            concept(2, "C", ConceptType::Concept, 0.5, 0.5),
        ];
        rank(&mut concepts);
        let ids: Vec<u32> = concepts.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 0, 2]);
    }

    #[test]
    fn test_under_cap_untouched() {
        let concepts = vec![concept(0, "A", ConceptType::Concept, 0.5, 0.5)];
        assert_eq!(select_diverse(concepts.clone(), 80), concepts);
    }

    #[test]
    fn test_minority_type_survives_cap() {
        let mut concepts: Vec<Concept> = (0..10)
            .map(|i| concept(i, &format!("Concept {i}"), ConceptType::Concept, 0.9, 0.9))
            .collect();
        concepts.push(concept(10, "Sorting Algorithm", ConceptType::Method, 0.5, 0.5));
        rank(&mut concepts);

        let selected = select_diverse(concepts, 4);
        assert_eq!(selected.len(), 4);
        assert!(selected.iter().any(|c| c.concept_type == ConceptType::Method));
        let ids: Vec<u32> = selected.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 10]);
    }
}
