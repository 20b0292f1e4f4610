//! Per-document extraction state
//!
//! One context is created per extraction call and threaded through every
//! stage. Nothing in it outlives the call.

use std::collections::HashSet;

use docgraph_core::{ConceptId, ExtractionStats};

use crate::dedup::is_near_duplicate;

/// Accepted concept names, id allocation and run statistics
#[derive(Debug, Default)]
pub struct ExtractionContext {
    /// Lower-cased accepted names in acceptance order
    accepted: Vec<String>,
    accepted_set: HashSet<String>,
    next_id: u32,
    pub stats: ExtractionStats,
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact case-insensitive match against an accepted name
    pub fn is_known(&self, name: &str) -> bool {
        self.accepted_set.contains(&name.to_lowercase())
    }

    /// Substring or token-overlap match against any accepted name
    pub fn is_near_duplicate(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.accepted.iter().any(|existing| is_near_duplicate(&lower, existing))
    }

    /// Record an accepted name and hand out the next id
    pub fn accept(&mut self, name: &str) -> ConceptId {
        let lower = name.to_lowercase();
        self.accepted_set.insert(lower.clone());
        self.accepted.push(lower);

        let id = ConceptId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn into_stats(self) -> ExtractionStats {
        self.stats
    }
}
