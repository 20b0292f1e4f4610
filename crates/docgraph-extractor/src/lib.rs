//! DocGraph Extractor - Document-to-knowledge-graph extraction pipeline
//!
//! Turns parsed pages into sections, concepts and typed relationships:
//! - `section`: heading detection from layout metadata
//! - `candidate` / `validate` / `select`: concept generation, scoring and selection
//! - `relation` / `dedup`: pattern and proximity relationships
//! - `pipeline`: the per-document orchestration returning an `ExtractionResult`

use docgraph_core::{DocGraphError, Relationship, Result};
use regex::Regex;

pub mod candidate;
pub mod concept;
pub mod context;
pub mod dedup;
pub mod figures;
pub mod lexicon;
pub mod patterns;
pub mod pipeline;
pub mod relation;
pub mod section;
pub mod select;
pub mod stats;
pub mod text;
pub mod validate;

pub use concept::ConceptStage;
pub use context::ExtractionContext;
pub use pipeline::DocumentPipeline;
pub use relation::{ConceptIndex, PatternRelationExtractor, ProximityRelationExtractor};
pub use section::SectionClassifier;
pub use text::DocumentText;
pub use validate::{ConceptValidator, RejectReason, Validation};

/// Trait for relationship extractors
///
/// Implementations see the whole document text and the final concept set,
/// and may only emit relationships between concepts in `index`.
pub trait RelationExtractor: Send + Sync {
    fn extract(&self, text: &DocumentText, index: &ConceptIndex) -> Result<Vec<Relationship>>;

    /// Extractor name for logging
    fn name(&self) -> &str;
}

/// Compile a static pattern, reporting failures as `InvalidPattern`
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| DocGraphError::InvalidPattern(format!("{pattern}: {e}")))
}
