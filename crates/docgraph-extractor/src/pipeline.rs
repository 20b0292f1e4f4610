//! Per-document extraction pipeline
//!
//! `DocumentPipeline` owns the compiled stages and is reusable across
//! documents; all mutable state lives in a per-call `ExtractionContext`.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::concept::ConceptStage;
use crate::context::ExtractionContext;
use crate::dedup::dedup_relationships;
use crate::figures::FigureExtractor;
use crate::relation::{ConceptIndex, PatternRelationExtractor, ProximityRelationExtractor};
use crate::section::SectionClassifier;
use crate::stats::document_stats;
use crate::text::DocumentText;
use crate::RelationExtractor;
use docgraph_core::{
    DocGraphError, DocumentInput, DocumentSource, ExtractionConfig, ExtractionMetadata,
    ExtractionResult, ExtractionStats, Figure, FigureKind, Relationship, Result, Section,
};

// ============================================================================
// Pipeline
// ============================================================================

/// Document-to-knowledge-graph pipeline
pub struct DocumentPipeline {
    sections: SectionClassifier,
    concepts: ConceptStage,
    figures: FigureExtractor,

    /// Relationship extractors, run in order
    extractors: Vec<Box<dyn RelationExtractor>>,

    config: ExtractionConfig,
}

impl DocumentPipeline {
    /// Create a pipeline with the pattern and proximity extractors
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;

        let pattern = PatternRelationExtractor::new(config.relationships.clone())?;
        let proximity = ProximityRelationExtractor::new(config.relationships.clone());

        let pipeline = Self {
            sections: SectionClassifier::new(config.sections.clone())?,
            concepts: ConceptStage::new(&config)?,
            figures: FigureExtractor::new()?,
            extractors: Vec::new(),
            config,
        };
        Ok(pipeline
            .with_extractor(Box::new(pattern))
            .with_extractor(Box::new(proximity)))
    }

    /// Add a relationship extractor after the ones already registered
    pub fn with_extractor(mut self, extractor: Box<dyn RelationExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Load a document from `source` and extract it.
    ///
    /// A source that cannot be read yields an unsuccessful fallback result.
    pub fn extract_from_source(&self, source: &dyn DocumentSource) -> ExtractionResult {
        match source.load() {
            Ok(document) => self.extract(&document),
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", source.describe(), e);
                let error = if matches!(e, DocGraphError::DocumentUnreadable(_)) {
                    e
                } else {
                    DocGraphError::DocumentUnreadable(e.to_string())
                };
                ExtractionResult::fallback(Uuid::nil(), error.to_string(), ExtractionStats::default())
            }
        }
    }

    /// Run the whole pipeline. Never fails: unusable input produces an
    /// unsuccessful fallback result and per-page failures are skipped.
    pub fn extract(&self, document: &DocumentInput) -> ExtractionResult {
        let start_time = Instant::now();
        let document_id = document.document_id;
        let mut stats = ExtractionStats {
            pages_total: document.pages.len(),
            ..Default::default()
        };

        tracing::info!(%document_id, pages = stats.pages_total, "Extraction started");

        if document.pages.is_empty() {
            return ExtractionResult::fallback(document_id, "document has no pages", stats);
        }

        let max_pages = self.config.limits.max_pages;
        stats.pages_truncated = document.pages.len().saturating_sub(max_pages);

        // 1. Sections, figures and text per page
        let mut text = DocumentText::new();
        let mut sections: Vec<Section> = Vec::new();
        let mut figures: Vec<Figure> = Vec::new();
        let mut processed: Vec<(u32, &str)> = Vec::new();

        for page in document.pages.iter().take(max_pages) {
            let page_sections = match self.sections.classify_page(page) {
                Ok(page_sections) => page_sections,
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", page.number, e);
                    stats.pages_skipped += 1;
                    stats.skipped_pages.push(page.number);
                    continue;
                }
            };

            stats.pages_processed += 1;
            stats.text_blocks_found += page.spans.iter().filter(|s| !s.text.trim().is_empty()).count();
            stats.headings_found += page_sections.len();
            sections.extend(page_sections);

            for figure in self.figures.extract_page(page) {
                match figure.kind {
                    FigureKind::Table { .. } => stats.tables_found += 1,
                    FigureKind::Image { .. } => stats.images_found += 1,
                    FigureKind::Figure => {}
                }
                figures.push(figure);
            }

            text.push_page(page.number, &page.text);
            processed.push((page.number, page.text.as_str()));
        }

        if text.is_blank() {
            let mut result = ExtractionResult::fallback(document_id, "no extractable text", stats);
            result.figures = figures;
            return result;
        }

        if sections.is_empty() {
            tracing::debug!("No headings found, using fallback section");
            sections.push(self.sections.fallback_section(text.as_str()));
        }

        // 2. Concepts
        let mut ctx = ExtractionContext::new();
        let concepts = self.concepts.extract(&sections, &processed, &mut ctx);
        let concept_stats = ctx.into_stats();
        stats.raw_candidates = concept_stats.raw_candidates;
        stats.candidates_rejected = concept_stats.candidates_rejected;
        stats.near_duplicates_skipped = concept_stats.near_duplicates_skipped;
        stats.malformed_matches = concept_stats.malformed_matches;

        // 3. Relationships
        let index = ConceptIndex::build(&concepts, &text);
        let mut relationships: Vec<Relationship> = Vec::new();
        for extractor in &self.extractors {
            match extractor.extract(&text, &index) {
                Ok(found) => {
                    tracing::debug!("{} extractor found {} relationships", extractor.name(), found.len());
                    relationships.extend(found);
                }
                Err(e) => tracing::warn!("{} extractor failed: {}", extractor.name(), e),
            }
        }
        let relationships = dedup_relationships(relationships, self.config.limits.max_relationships);

        // 4. Graph
        let graph = docgraph_graph::build_graph(&concepts, &relationships);

        stats.concepts_extracted = concepts.len();
        stats.relationships_found = relationships.len();

        tracing::info!(
            %document_id,
            sections = sections.len(),
            concepts = concepts.len(),
            relationships = relationships.len(),
            skipped_pages = stats.pages_skipped,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Extraction completed"
        );

        let document_stats = document_stats(text.as_str(), stats.pages_processed);

        ExtractionResult {
            document_id,
            total_pages: stats.pages_total,
            sections,
            figures,
            concepts,
            relationships,
            graph,
            extraction_metadata: ExtractionMetadata {
                success: true,
                stats,
                document_stats: Some(document_stats),
                error: None,
                processed_at: Utc::now(),
                processor_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
