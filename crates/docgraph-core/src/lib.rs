//! DocGraph Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout DocGraph:
//! - The input contract handed over by a document parser (pages, spans, primitives)
//! - Extraction records (sections, concepts, relationships, figures)
//! - The concept graph and its summary statistics
//! - The result envelope returned by every extraction call
//! - Common error types and configuration

pub mod config;

pub use config::{
    AppConfig, CandidateConfig, ConfigError, ExtractionConfig, LimitsConfig, LoggingConfig,
    RelationshipConfig, SectionConfig,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for DocGraph operations
#[derive(Error, Debug)]
pub enum DocGraphError {
    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("Page {page} could not be processed: {reason}")]
    PageFailed { page: u32, reason: String },

    #[error("Malformed match for pattern {pattern}: {reason}")]
    MalformedMatch { pattern: usize, reason: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, DocGraphError>;

// ============================================================================
// Input Contract
// ============================================================================

/// A run of text with uniform font attributes, as reported by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    #[serde(default)]
    pub is_bold: bool,
    #[serde(default)]
    pub font_name: String,
}

impl TextSpan {
    /// Create a regular-weight span
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold: false,
            font_name: String::new(),
        }
    }

    /// Mark the span as bold
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Set the font name
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }
}

/// Table detected on a page by the parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePrimitive {
    pub rows: Vec<Vec<String>>,
}

/// Embedded image detected on a page by the parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePrimitive {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub size_bytes: u64,
}

/// One page of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// 1-based page number
    pub number: u32,

    /// Full extractable text of the page
    #[serde(default)]
    pub text: String,

    /// Text spans with layout metadata
    #[serde(default)]
    pub spans: Vec<TextSpan>,

    #[serde(default)]
    pub tables: Vec<TablePrimitive>,

    #[serde(default)]
    pub images: Vec<ImagePrimitive>,

    /// Set by the parser when it could not decode this page
    #[serde(default)]
    pub error: Option<String>,
}

impl PageInput {
    /// Create a page with text and no layout metadata
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a span
    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.spans.push(span);
        self
    }
}

/// A parsed document handed over for extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default = "Uuid::new_v4")]
    pub document_id: Uuid,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Create a document from its pages
    pub fn new(pages: Vec<PageInput>) -> Self {
        Self {
            document_id: Uuid::new_v4(),
            title: None,
            pages,
        }
    }

    /// Set the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Collaborator that opens and parses a source document
///
/// A failing `load` is an input-open failure: the pipeline turns it into a
/// fallback result instead of propagating it.
pub trait DocumentSource {
    fn load(&self) -> Result<DocumentInput>;

    /// Name used in logs
    fn describe(&self) -> String {
        "document".to_string()
    }
}

impl DocumentSource for DocumentInput {
    fn load(&self) -> Result<DocumentInput> {
        Ok(self.clone())
    }
}

// ============================================================================
// Sections and Figures
// ============================================================================

/// A detected heading plus the body text that follows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub page: u32,
    /// Coarse heading level, 1 (largest) to 5
    pub level: u8,
    pub font_size: f32,
    pub is_bold: bool,
    pub word_count: usize,
}

impl Section {
    /// Create a section, deriving the word count from the content
    pub fn new(title: impl Into<String>, content: impl Into<String>, page: u32, level: u8) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            word_count: content.split_whitespace().count(),
            content,
            page,
            level: level.clamp(1, 5),
            font_size: 12.0,
            is_bold: false,
        }
    }
}

/// Kind-specific payload of a figure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FigureKind {
    Table {
        rows: usize,
        columns: usize,
        sample: Vec<Vec<String>>,
    },
    Image {
        width: u32,
        height: u32,
        format: String,
        size_bytes: u64,
    },
    /// Known only from a caption in the page text
    Figure,
}

/// Table, image, or captioned figure found on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub number: String,
    pub caption: String,
    pub page: u32,
    #[serde(flatten)]
    pub kind: FigureKind,
}

// ============================================================================
// Concepts
// ============================================================================

/// Concept identifier, assigned monotonically at acceptance time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u32);

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "concept_{}", self.0)
    }
}

/// Concept classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptType {
    Topic,
    Theory,
    Method,
    Mathematical,
    Concept,
}

impl ConceptType {
    pub const ALL: [ConceptType; 5] = [
        Self::Topic,
        Self::Theory,
        Self::Method,
        Self::Mathematical,
        Self::Concept,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Theory => "theory",
            Self::Method => "method",
            Self::Mathematical => "mathematical",
            Self::Concept => "concept",
        }
    }

    /// Minimum quality score for a candidate of this type to be accepted
    pub fn acceptance_threshold(&self) -> f32 {
        match self {
            Self::Theory | Self::Method | Self::Mathematical => 0.4,
            Self::Topic | Self::Concept => 0.3,
        }
    }
}

impl std::fmt::Display for ConceptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse confidence label attached to a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Derive a label from a quality score
    pub fn from_score(score: f32) -> Self {
        if score > 0.7 {
            Self::High
        } else if score > 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Where a concept was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptSource {
    Heading,
    Pattern,
    Proximity,
}

/// A named knowledge unit extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    pub name: String,
    #[serde(rename = "type")]
    pub concept_type: ConceptType,
    pub page: u32,
    pub description: String,
    pub importance: f32,
    pub quality_score: f32,
    pub confidence: Confidence,
    pub source: ConceptSource,
    pub extraction_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_kind: Option<String>,
    #[serde(default)]
    pub context: String,
}

impl Concept {
    /// Ranking key used for selection: quality weighted by importance
    pub fn rank_score(&self) -> f32 {
        self.quality_score * self.importance
    }
}

// ============================================================================
// Relationships
// ============================================================================

/// Relation taxonomy between concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Prerequisite,
    Related,
    Contains,
    Causes,
    Applies,
}

/// Base weight per relation kind, indexed by `RelationKind as usize`
const RELATION_WEIGHTS: [f32; 5] = [0.9, 0.5, 0.7, 0.8, 0.6];

impl RelationKind {
    /// Iteration order used by the pattern extractor
    pub const ALL: [RelationKind; 5] = [
        Self::Prerequisite,
        Self::Related,
        Self::Contains,
        Self::Causes,
        Self::Applies,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prerequisite => "prerequisite",
            Self::Related => "related",
            Self::Contains => "contains",
            Self::Causes => "causes",
            Self::Applies => "applies",
        }
    }

    /// Base weight used when scoring pattern relationships
    pub fn weight(&self) -> f32 {
        RELATION_WEIGHTS[*self as usize]
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a relationship was inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationSource {
    Pattern,
    Proximity,
}

/// A directed, typed, strength-weighted link between two concepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: ConceptId,
    pub to: ConceptId,
    pub relation: RelationKind,
    pub strength: f32,
    pub source: RelationSource,
    pub context: String,
}

// ============================================================================
// Concept Graph
// ============================================================================

/// A concept placed in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(flatten)]
    pub concept: Concept,
    pub centrality: f32,
    pub degree: usize,
}

/// Summary analytics of a concept graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub density: f32,
    pub avg_degree: f32,
    pub clustering_coefficient: f32,
    pub is_connected: bool,
    pub num_components: usize,
    pub has_cycles: bool,
    pub most_central_node: Option<ConceptId>,
    pub max_centrality: f32,
    pub type_distribution: BTreeMap<ConceptType, usize>,
    pub relationship_types: BTreeMap<RelationKind, usize>,
    pub avg_concept_quality: f32,
    pub high_quality_concepts: usize,
    pub quality_ratio: f32,
}

/// Directed concept graph rebuilt for every extraction call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Relationship>,
    pub stats: GraphStats,
}

// ============================================================================
// Result Envelope
// ============================================================================

/// Counters describing what the extraction processed and skipped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub pages_total: usize,
    pub pages_processed: usize,
    pub pages_skipped: usize,
    pub skipped_pages: Vec<u32>,
    /// Pages beyond the page cap that were never looked at
    pub pages_truncated: usize,
    pub text_blocks_found: usize,
    pub headings_found: usize,
    pub images_found: usize,
    pub tables_found: usize,
    pub raw_candidates: usize,
    pub candidates_rejected: BTreeMap<String, usize>,
    pub near_duplicates_skipped: usize,
    pub malformed_matches: usize,
    pub concepts_extracted: usize,
    pub relationships_found: usize,
}

impl ExtractionStats {
    /// Count a rejected candidate under its reason
    pub fn record_rejection(&mut self, reason: &str) {
        *self.candidates_rejected.entry(reason.to_string()).or_insert(0) += 1;
    }
}

/// Document-level statistics, used for reporting only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_characters: usize,
    pub total_words: usize,
    pub avg_words_per_page: f32,
    pub language_detected: String,
    pub document_type: String,
    pub reading_level: String,
}

/// Outcome metadata of an extraction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub success: bool,
    pub stats: ExtractionStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_stats: Option<DocumentStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub processor_version: String,
}

/// Everything one extraction call produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub document_id: Uuid,
    pub total_pages: usize,
    pub sections: Vec<Section>,
    pub figures: Vec<Figure>,
    pub concepts: Vec<Concept>,
    pub relationships: Vec<Relationship>,
    pub graph: ConceptGraph,
    pub extraction_metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Minimal result for a document that could not be processed
    pub fn fallback(document_id: Uuid, error: impl Into<String>, stats: ExtractionStats) -> Self {
        Self {
            document_id,
            total_pages: stats.pages_total,
            sections: vec![Section::new("Document", "Failed to process document", 1, 1)],
            figures: Vec::new(),
            concepts: Vec::new(),
            relationships: Vec::new(),
            graph: ConceptGraph::default(),
            extraction_metadata: ExtractionMetadata {
                success: false,
                stats,
                document_stats: None,
                error: Some(error.into()),
                processed_at: Utc::now(),
                processor_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
