//! Near-duplicate detection and relationship deduplication

use std::collections::HashSet;

use docgraph_core::{ConceptId, RelationKind, Relationship};

/// Token overlap above which two multi-word names are the same concept
pub const TOKEN_OVERLAP_THRESHOLD: f32 = 0.7;

/// Whether two names denote the same concept.
///
/// Comparison is case-insensitive. Names are duplicates when one is a
/// substring of the other, or when both have several words and the shared
/// token count over the shorter name's token count exceeds the threshold.
pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    let a_tokens: HashSet<&str> = a.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b.split_whitespace().collect();
    if a_tokens.len() > 1 && b_tokens.len() > 1 {
        let overlap = a_tokens.intersection(&b_tokens).count();
        let shorter = a_tokens.len().min(b_tokens.len());
        return overlap as f32 / shorter as f32 > TOKEN_OVERLAP_THRESHOLD;
    }

    false
}

/// Collapse `(a, b, r)` / `(b, a, r)` pairs, rank by strength and cap.
///
/// The stronger instance of a pair survives; ties keep the earlier one.
pub fn dedup_relationships(mut relationships: Vec<Relationship>, cap: usize) -> Vec<Relationship> {
    relationships.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    let mut seen: HashSet<(ConceptId, ConceptId, RelationKind)> = HashSet::new();
    relationships.retain(|rel| {
        let (lo, hi) = if rel.from <= rel.to {
            (rel.from, rel.to)
        } else {
            (rel.to, rel.from)
        };
        seen.insert((lo, hi, rel.relation))
    });

    relationships.truncate(cap);
    relationships
}
