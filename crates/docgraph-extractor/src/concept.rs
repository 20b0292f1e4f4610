//! Concept extraction stage
//!
//! Runs candidate generation, validation and acceptance against the
//! per-document `ExtractionContext`, then filters, ranks and caps the result.

use tracing::{debug, info};

use crate::candidate::{CandidateGenerator, CandidateOrigin, ConceptCandidate};
use crate::context::ExtractionContext;
use crate::select::{quality_filter, rank, select_diverse};
use crate::text::{preview, truncate_chars};
use crate::validate::{ConceptValidator, Validation};
use docgraph_core::{
    Concept, ConceptId, ConceptSource, Confidence, ExtractionConfig, LimitsConfig, Result, Section,
};

const DESCRIPTION_CHARS: usize = 300;
const PATTERN_DESCRIPTION_CHARS: usize = 200;
const CONTEXT_CHARS: usize = 300;

/// Page and window decay applied to pattern importance
const PAGE_DECAY: f32 = 0.05;
const WINDOW_DECAY: f32 = 0.1;

pub struct ConceptStage {
    generator: CandidateGenerator,
    validator: ConceptValidator,
    limits: LimitsConfig,
}

impl ConceptStage {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            generator: CandidateGenerator::new(config.candidates.clone())?,
            validator: ConceptValidator::new()?,
            limits: config.limits.clone(),
        })
    }

    /// Extract the final concept set of a document.
    ///
    /// `pages` are `(page number, page text)` in page order.
    pub fn extract(
        &self,
        sections: &[Section],
        pages: &[(u32, &str)],
        ctx: &mut ExtractionContext,
    ) -> Vec<Concept> {
        let cap = self.limits.max_raw_candidates;
        let mut accepted = Vec::new();

        for section in sections {
            if accepted.len() >= cap {
                break;
            }
            match self.generator.heading_candidate(section) {
                Some(candidate) => self.consider(candidate, ctx, &mut accepted),
                None => ctx.stats.record_rejection("non_concept_heading"),
            }
        }

        'pages: for (page, text) in pages {
            for (window_index, window) in self.generator.page_windows(text).iter().enumerate() {
                for candidate in self.generator.window_candidates(window, *page, window_index) {
                    if accepted.len() >= cap {
                        debug!(cap, "Raw candidate cap reached");
                        break 'pages;
                    }
                    match candidate {
                        Ok(candidate) => self.consider(candidate, ctx, &mut accepted),
                        Err(e) => {
                            ctx.stats.malformed_matches += 1;
                            debug!(page, error = %e, "Skipping malformed match");
                        }
                    }
                }
            }
        }

        let before_filters = accepted.len();
        accepted.retain(|concept| match quality_filter(concept) {
            Some(reason) => {
                ctx.stats.record_rejection(reason);
                false
            }
            None => true,
        });

        rank(&mut accepted);
        let selected = select_diverse(accepted, self.limits.max_concepts);

        info!(
            raw_candidates = ctx.stats.raw_candidates,
            accepted = before_filters,
            selected = selected.len(),
            near_duplicates = ctx.stats.near_duplicates_skipped,
            "Concept extraction complete"
        );
        selected
    }

    /// Validate one candidate and accept it into `out` if it survives
    fn consider(&self, candidate: ConceptCandidate, ctx: &mut ExtractionContext, out: &mut Vec<Concept>) {
        ctx.stats.raw_candidates += 1;

        if ctx.is_near_duplicate(&candidate.raw_name) {
            ctx.stats.near_duplicates_skipped += 1;
            return;
        }

        let validation = self.validator.validate(&candidate.raw_name, &candidate.context);
        if let Some(reason) = validation.rejection {
            ctx.stats.record_rejection(reason.as_str());
            return;
        }
        if ctx.is_known(&validation.cleaned_name) {
            ctx.stats.record_rejection("duplicate");
            return;
        }
        if ctx.is_near_duplicate(&validation.cleaned_name) {
            ctx.stats.near_duplicates_skipped += 1;
            return;
        }

        let id = ctx.accept(&validation.cleaned_name);
        out.push(build_concept(id, candidate, validation));
    }
}

fn build_concept(id: ConceptId, candidate: ConceptCandidate, v: Validation) -> Concept {
    let quality = v.score;
    match candidate.origin {
        CandidateOrigin::Heading { level } => Concept {
            id,
            name: v.cleaned_name,
            concept_type: v.concept_type,
            page: candidate.page,
            description: preview(&candidate.context, DESCRIPTION_CHARS),
            importance: heading_importance(quality, level),
            quality_score: quality,
            confidence: Confidence::High,
            source: ConceptSource::Heading,
            extraction_method: "section_title".to_string(),
            pattern_kind: None,
            context: format!("Section heading: {}", candidate.raw_name),
        },
        CandidateOrigin::Pattern {
            index,
            kind,
            weight,
            window,
        } => Concept {
            id,
            name: v.cleaned_name,
            concept_type: v.concept_type,
            page: candidate.page,
            description: format!(
                "Extracted from page {}: {}...",
                candidate.page,
                truncate_chars(&candidate.context, PATTERN_DESCRIPTION_CHARS)
            ),
            importance: pattern_importance(quality, weight, candidate.page, window),
            quality_score: quality,
            confidence: Confidence::from_score(quality),
            source: ConceptSource::Pattern,
            extraction_method: format!("pattern_{index}"),
            pattern_kind: Some(kind.as_str().to_string()),
            context: preview(&candidate.context, CONTEXT_CHARS),
        },
    }
}

/// Headings get a boost that shrinks with depth
pub fn heading_importance(quality: f32, level: u8) -> f32 {
    (quality + (1.0 - 0.1 * f32::from(level))).clamp(0.0, 1.0)
}

/// Pattern matches decay with page number and window position
pub fn pattern_importance(quality: f32, weight: f32, page: u32, window: usize) -> f32 {
    let page_factor = 1.0 - PAGE_DECAY * page.saturating_sub(1) as f32;
    let window_factor = 1.0 - WINDOW_DECAY * window as f32;
    (quality * weight * page_factor * window_factor).clamp(0.0, 1.0)
}
