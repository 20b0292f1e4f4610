//! DocGraph Graph - Concept graph assembly and analytics
//!
//! Builds a directed graph from accepted concepts and relationships and
//! computes its summary statistics. The graph is rebuilt for every
//! extraction call.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use docgraph_core::{Concept, ConceptGraph, ConceptId, GraphNode, Relationship};

pub mod analytics;

pub use analytics::graph_stats;

/// Incremental builder over a petgraph `DiGraph`
#[derive(Debug, Default)]
pub struct ConceptGraphBuilder {
    graph: DiGraph<ConceptId, f32>,
    id_to_node: HashMap<ConceptId, NodeIndex>,
    concepts: Vec<Concept>,
    edges: Vec<Relationship>,
    dropped_edges: usize,
}

impl ConceptGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a concept node; a repeated id is ignored
    pub fn add_concept(&mut self, concept: &Concept) {
        if self.id_to_node.contains_key(&concept.id) {
            return;
        }
        let idx = self.graph.add_node(concept.id);
        self.id_to_node.insert(concept.id, idx);
        self.concepts.push(concept.clone());
    }

    /// Add an edge if both endpoints are known and the ordered pair is free.
    ///
    /// Returns whether the edge was kept.
    pub fn add_relationship(&mut self, rel: &Relationship) -> bool {
        let (Some(&from), Some(&to)) = (self.id_to_node.get(&rel.from), self.id_to_node.get(&rel.to))
        else {
            self.dropped_edges += 1;
            return false;
        };
        if from == to || self.graph.find_edge(from, to).is_some() {
            self.dropped_edges += 1;
            return false;
        }

        self.graph.add_edge(from, to, rel.strength);
        self.edges.push(rel.clone());
        true
    }

    /// Compute per-node and graph-level analytics
    pub fn finalize(self) -> ConceptGraph {
        let projection = analytics::undirected_projection(&self.graph);
        let centrality = analytics::degree_centrality(&projection);
        let degrees = analytics::degrees(&self.graph);
        let stats = graph_stats(&self.graph, &projection, &self.concepts, &self.edges, &centrality);

        debug!(
            nodes = stats.total_nodes,
            edges = stats.total_edges,
            dropped = self.dropped_edges,
            components = stats.num_components,
            "Concept graph built"
        );

        let nodes = self
            .concepts
            .into_iter()
            .enumerate()
            .map(|(i, concept)| GraphNode {
                concept,
                centrality: analytics::round_to(centrality.get(i).copied().unwrap_or(0.0), 3),
                degree: degrees.get(i).copied().unwrap_or(0),
            })
            .collect();

        ConceptGraph {
            nodes,
            edges: self.edges,
            stats,
        }
    }
}

/// Build the concept graph.
///
/// Edges referencing unknown concepts are dropped silently. When several
/// relationships share an ordered pair, the strongest one is kept.
pub fn build_graph(concepts: &[Concept], relationships: &[Relationship]) -> ConceptGraph {
    let mut builder = ConceptGraphBuilder::new();
    for concept in concepts {
        builder.add_concept(concept);
    }

    let mut ranked: Vec<&Relationship> = relationships.iter().collect();
    ranked.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    for rel in ranked {
        builder.add_relationship(rel);
    }

    builder.finalize()
}
