//! Relationship extraction
//!
//! Two independent extractors run over the full document text:
//! - `PatternRelationExtractor`: relation phrases ("requires X", "used in X")
//!   whose captured target mentions known concepts
//! - `ProximityRelationExtractor`: concept pairs that co-occur repeatedly

use regex::Regex;
use tracing::debug;

use crate::compile_pattern;
use crate::lexicon::{mentions_any, RELATION_CONTEXT_INDICATORS};
use crate::text::{floor_char_boundary, slice_around, truncate_chars, DocumentText};
use crate::RelationExtractor;
use docgraph_core::{
    Concept, ConceptId, RelationKind, RelationSource, Relationship, RelationshipConfig, Result,
};

// ============================================================================
// Concept Index
// ============================================================================

/// A concept with its occurrences in the document text
#[derive(Debug, Clone)]
pub struct IndexedConcept {
    pub id: ConceptId,
    /// ASCII-lower-cased name, comparable against `DocumentText::lower`
    pub name_lower: String,
    pub page: u32,
    /// Sorted byte offsets of every occurrence
    pub positions: Vec<usize>,
}

/// Lookup structure over the final concept set
#[derive(Debug, Clone, Default)]
pub struct ConceptIndex {
    entries: Vec<IndexedConcept>,
}

impl ConceptIndex {
    /// Index concepts in the given order
    pub fn build(concepts: &[Concept], text: &DocumentText) -> Self {
        let entries = concepts
            .iter()
            .map(|concept| {
                let name_lower = concept.name.to_ascii_lowercase();
                IndexedConcept {
                    id: concept.id,
                    positions: text.positions_of(&name_lower),
                    name_lower,
                    page: concept.page,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedConcept> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Smallest distance between two sorted position lists
fn min_gap(a: &[usize], b: &[usize]) -> Option<usize> {
    let (mut i, mut j) = (0, 0);
    let mut best: Option<usize> = None;
    while i < a.len() && j < b.len() {
        let gap = a[i].abs_diff(b[j]);
        best = Some(best.map_or(gap, |g| g.min(gap)));
        if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    best
}

// ============================================================================
// Pattern-based extraction
// ============================================================================

/// Relation phrase templates; group 1 is the free-text target phrase
const RELATION_TEMPLATES: &[(RelationKind, &str)] = &[
    (
        RelationKind::Prerequisite,
        r"(?:requires?|needs?|depends?\s+on|builds?\s+on|based\s+on|relies\s+on)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Prerequisite,
        r"(?:before|prior\s+to|prerequisite\s+for|foundation\s+for)\s+([^,]{5,50})",
    ),
    (RelationKind::Prerequisite, r"(?:assumes?|given|provided)\s+([^.]{5,50})"),
    (RelationKind::Prerequisite, r"(?:first|initially|begin\s+with)\s+([^.]{5,50})"),
    (
        RelationKind::Prerequisite,
        r"(?:fundamental|basic|elementary)\s+([^.]{5,50})\s+(?:is\s+needed|required)",
    ),
    (
        RelationKind::Related,
        r"(?:similar\s+to|related\s+to|connected\s+to|associated\s+with)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Related,
        r"(?:see\s+also|compare\s+with|cf\.|versus|vs\.?)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Related,
        r"(?:analogous\s+to|like|resembles?|corresponds?\s+to)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Related,
        r"(?:in\s+contrast\s+to|unlike|different\s+from)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Related,
        r"(?:together\s+with|along\s+with|combined\s+with)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Contains,
        r"(?:includes?|contains?|consists?\s+of|comprises?)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Contains,
        r"(?:types?\s+of|kinds?\s+of|forms?\s+of|varieties?\s+of)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Contains,
        r"(?:examples?\s+of|instances?\s+of|cases?\s+of)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Contains,
        r"(?:components?\s+of|parts?\s+of|elements?\s+of)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Contains,
        r"(?:subdivided\s+into|categorized\s+as|classified\s+as)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Causes,
        r"(?:causes?|leads?\s+to|results?\s+in|produces?)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Causes,
        r"(?:due\s+to|because\s+of|owing\s+to|as\s+a\s+result\s+of)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Causes,
        r"(?:triggers?|initiates?|generates?|creates?)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Applies,
        r"(?:used\s+in|applied\s+to|employed\s+in|utilized\s+for)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Applies,
        r"(?:application\s+of|use\s+of|implementation\s+of)\s+([^.]{5,50})",
    ),
    (
        RelationKind::Applies,
        r"(?:solves?|addresses?|handles?|deals\s+with)\s+([^.]{5,50})",
    ),
];

const BASE_STRENGTH: f32 = 0.6;
const CLOSE_BONUS: (usize, f32) = (100, 0.2);
const NEAR_BONUS: (usize, f32) = (300, 0.1);
const INDICATOR_RADIUS: usize = 100;
const INDICATOR_BONUS: f32 = 0.1;
const CONTEXT_PREVIEW_CHARS: usize = 100;

/// Compiled relation template
#[derive(Debug, Clone)]
pub struct RelationTemplate {
    pub relation: RelationKind,
    pub regex: Regex,
}

/// Extracts typed relationships from relation phrases
pub struct PatternRelationExtractor {
    templates: Vec<RelationTemplate>,
    config: RelationshipConfig,
}

impl PatternRelationExtractor {
    pub fn new(config: RelationshipConfig) -> Result<Self> {
        let templates = RELATION_TEMPLATES
            .iter()
            .map(|(relation, pattern)| {
                Ok(RelationTemplate {
                    relation: *relation,
                    regex: compile_pattern(&format!("(?im){pattern}"))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { templates, config })
    }

    /// Closest concept mentioned in the window before `position`.
    ///
    /// Distance runs from the end of the mention to `position`; ties go to
    /// the longer, more specific name.
    pub fn nearest_preceding<'a>(
        &self,
        text: &DocumentText,
        position: usize,
        index: &'a ConceptIndex,
    ) -> Option<&'a IndexedConcept> {
        let lower = text.lower();
        let position = floor_char_boundary(lower, position);
        let start = floor_char_boundary(lower, position.saturating_sub(self.config.source_window_chars));
        let window = &lower[start..position];

        index
            .iter()
            .filter_map(|concept| {
                window
                    .rfind(&concept.name_lower)
                    .map(|pos| (concept, window.len() - (pos + concept.name_lower.len())))
            })
            .min_by_key(|(concept, distance)| (*distance, std::cmp::Reverse(concept.name_lower.len())))
            .map(|(concept, _)| concept)
    }

    /// Score a candidate edge found at `position`
    pub fn strength(
        &self,
        relation: RelationKind,
        source: &IndexedConcept,
        target: &IndexedConcept,
        position: usize,
        text: &DocumentText,
    ) -> f32 {
        let mut strength = BASE_STRENGTH * relation.weight();

        match min_gap(&source.positions, &target.positions) {
            Some(gap) if gap < CLOSE_BONUS.0 => strength += CLOSE_BONUS.1,
            Some(gap) if gap < NEAR_BONUS.0 => strength += NEAR_BONUS.1,
            _ => {}
        }

        let context = slice_around(text.lower(), position, position, INDICATOR_RADIUS);
        if mentions_any(context, RELATION_CONTEXT_INDICATORS) {
            strength += INDICATOR_BONUS;
        }

        strength.min(1.0)
    }
}

impl RelationExtractor for PatternRelationExtractor {
    fn extract(&self, text: &DocumentText, index: &ConceptIndex) -> Result<Vec<Relationship>> {
        let mut relationships = Vec::new();
        if index.is_empty() {
            return Ok(relationships);
        }

        for template in &self.templates {
            for caps in template.regex.captures_iter(text.as_str()) {
                let (Some(whole), Some(phrase)) = (caps.get(0), caps.get(1)) else {
                    debug!(relation = %template.relation, "Skipping match without target phrase");
                    continue;
                };

                let phrase = phrase.as_str().to_ascii_lowercase();
                let targets: Vec<&IndexedConcept> = index
                    .iter()
                    .filter(|concept| phrase.contains(&concept.name_lower))
                    .collect();
                if targets.is_empty() {
                    continue;
                }

                let Some(source) = self.nearest_preceding(text, whole.start(), index) else {
                    continue;
                };

                // One edge per mentioned concept, all from the same source
                for target in targets {
                    if target.id == source.id {
                        continue;
                    }
                    let strength = self.strength(template.relation, source, target, whole.start(), text);
                    if strength < self.config.min_strength {
                        continue;
                    }
                    relationships.push(Relationship {
                        from: source.id,
                        to: target.id,
                        relation: template.relation,
                        strength,
                        source: RelationSource::Pattern,
                        context: format!(
                            "{}...",
                            truncate_chars(whole.as_str(), CONTEXT_PREVIEW_CHARS)
                        ),
                    });
                }
            }
        }

        Ok(relationships)
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

// ============================================================================
// Proximity-based extraction
// ============================================================================

const PROXIMITY_MAX_STRENGTH: f32 = 0.8;
const PROXIMITY_CONTEXT: &str = "Concepts appear together frequently";

/// Infers `related` edges from repeated co-occurrence
pub struct ProximityRelationExtractor {
    config: RelationshipConfig,
}

impl ProximityRelationExtractor {
    pub fn new(config: RelationshipConfig) -> Self {
        Self { config }
    }

    /// Occurrence pairs closer than the proximity window
    fn close_occurrences(&self, a: &[usize], b: &[usize]) -> usize {
        let window = self.config.proximity_window_chars;
        a.iter()
            .map(|&pos| {
                let lo = b.partition_point(|&q| q.saturating_add(window) <= pos);
                let hi = b.partition_point(|&q| q < pos.saturating_add(window));
                hi - lo
            })
            .sum()
    }
}

impl RelationExtractor for ProximityRelationExtractor {
    fn extract(&self, _text: &DocumentText, index: &ConceptIndex) -> Result<Vec<Relationship>> {
        let concepts: Vec<&IndexedConcept> = index.iter().collect();
        let mut relationships = Vec::new();

        for (i, first) in concepts.iter().enumerate() {
            for second in &concepts[i + 1..] {
                if first.page.abs_diff(second.page) > self.config.max_page_gap {
                    continue;
                }
                if first.positions.is_empty() || second.positions.is_empty() {
                    continue;
                }
                let most = first.positions.len().max(second.positions.len());

                let close = self.close_occurrences(&first.positions, &second.positions);
                if close == 0 {
                    continue;
                }

                let strength = (close as f32 / most as f32).min(PROXIMITY_MAX_STRENGTH);
                if strength < self.config.min_strength {
                    continue;
                }

                relationships.push(Relationship {
                    from: first.id,
                    to: second.id,
                    relation: RelationKind::Related,
                    strength,
                    source: RelationSource::Proximity,
                    context: PROXIMITY_CONTEXT.to_string(),
                });
            }
        }

        Ok(relationships)
    }

    fn name(&self) -> &str {
        "proximity"
    }
}

// ============================================================================
// Tests
// ============================================================================
