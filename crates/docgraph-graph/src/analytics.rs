//! Graph analytics as free functions over petgraph graphs
//!
//! Every function degrades to 0 / neutral values on empty and single-node
//! graphs instead of failing.

use std::collections::{BTreeMap, HashSet};

use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::Direction;

use docgraph_core::{Concept, ConceptId, ConceptType, GraphStats, RelationKind, Relationship};

/// Quality above which a concept counts as high quality
pub const HIGH_QUALITY_THRESHOLD: f32 = 0.7;

/// Undirected projection with the same node indices and at most one edge per pair
pub fn undirected_projection(graph: &DiGraph<ConceptId, f32>) -> UnGraph<ConceptId, ()> {
    let mut projection = UnGraph::with_capacity(graph.node_count(), graph.edge_count());
    for id in graph.node_weights() {
        projection.add_node(*id);
    }
    for edge in graph.raw_edges() {
        projection.update_edge(edge.source(), edge.target(), ());
    }
    projection
}

/// In-degree plus out-degree, indexed by node index
pub fn degrees(graph: &DiGraph<ConceptId, f32>) -> Vec<usize> {
    graph
        .node_indices()
        .map(|n| {
            graph.neighbors_directed(n, Direction::Outgoing).count()
                + graph.neighbors_directed(n, Direction::Incoming).count()
        })
        .collect()
}

/// Fraction of other nodes each node is directly connected to
pub fn degree_centrality(projection: &UnGraph<ConceptId, ()>) -> Vec<f32> {
    let n = projection.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    projection
        .node_indices()
        .map(|node| distinct_neighbors(projection, node).len() as f32 / (n - 1) as f32)
        .collect()
}

/// Edges over possible directed edges
pub fn density(node_count: usize, edge_count: usize) -> f32 {
    if node_count < 2 {
        return 0.0;
    }
    edge_count as f32 / (node_count * (node_count - 1)) as f32
}

pub fn average_degree(node_count: usize, edge_count: usize) -> f32 {
    if node_count == 0 {
        return 0.0;
    }
    2.0 * edge_count as f32 / node_count as f32
}

/// Average local clustering coefficient of the undirected projection
pub fn clustering_coefficient(projection: &UnGraph<ConceptId, ()>) -> f32 {
    let n = projection.node_count();
    if n < 3 {
        return 0.0;
    }

    let total: f32 = projection
        .node_indices()
        .map(|node| {
            let neighbors: Vec<NodeIndex> = distinct_neighbors(projection, node).into_iter().collect();
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let mut links = 0usize;
            for (i, a) in neighbors.iter().enumerate() {
                for b in &neighbors[i + 1..] {
                    if projection.find_edge(*a, *b).is_some() {
                        links += 1;
                    }
                }
            }
            2.0 * links as f32 / (k * (k - 1)) as f32
        })
        .sum();

    total / n as f32
}

fn distinct_neighbors(projection: &UnGraph<ConceptId, ()>, node: NodeIndex) -> HashSet<NodeIndex> {
    projection.neighbors(node).filter(|n| *n != node).collect()
}

/// Number of connected components of the undirected projection
pub fn component_count(projection: &UnGraph<ConceptId, ()>) -> usize {
    if projection.node_count() == 0 {
        return 0;
    }
    connected_components(projection)
}

pub fn has_cycles(graph: &DiGraph<ConceptId, f32>) -> bool {
    is_cyclic_directed(graph)
}

/// First node with maximal centrality
pub fn most_central(ids: &[ConceptId], centrality: &[f32]) -> Option<(ConceptId, f32)> {
    ids.iter()
        .zip(centrality)
        .fold(None, |best: Option<(ConceptId, f32)>, (id, c)| match best {
            Some((_, best_c)) if best_c >= *c => best,
            _ => Some((*id, *c)),
        })
}

pub fn type_distribution(concepts: &[Concept]) -> BTreeMap<ConceptType, usize> {
    let mut histogram = BTreeMap::new();
    for concept in concepts {
        *histogram.entry(concept.concept_type).or_insert(0) += 1;
    }
    histogram
}

pub fn relationship_types(edges: &[Relationship]) -> BTreeMap<RelationKind, usize> {
    let mut histogram = BTreeMap::new();
    for edge in edges {
        *histogram.entry(edge.relation).or_insert(0) += 1;
    }
    histogram
}

/// Average quality, count above the threshold, and that count's ratio
pub fn quality_metrics(concepts: &[Concept]) -> (f32, usize, f32) {
    if concepts.is_empty() {
        return (0.0, 0, 0.0);
    }
    let n = concepts.len() as f32;
    let average = concepts.iter().map(|c| c.quality_score).sum::<f32>() / n;
    let high = concepts
        .iter()
        .filter(|c| c.quality_score > HIGH_QUALITY_THRESHOLD)
        .count();
    (average, high, high as f32 / n)
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// Summary statistics for a built graph
pub fn graph_stats(
    graph: &DiGraph<ConceptId, f32>,
    projection: &UnGraph<ConceptId, ()>,
    concepts: &[Concept],
    edges: &[Relationship],
    centrality: &[f32],
) -> GraphStats {
    let n = graph.node_count();
    let m = graph.edge_count();

    let components = component_count(projection);
    let ids: Vec<ConceptId> = graph.node_weights().copied().collect();
    let (most_central_node, max_centrality) = match most_central(&ids, centrality) {
        Some((id, c)) => (Some(id), c),
        None => (None, 0.0),
    };
    let (avg_quality, high_quality, quality_ratio) = quality_metrics(concepts);

    GraphStats {
        total_nodes: n,
        total_edges: m,
        density: round_to(density(n, m), 3),
        avg_degree: round_to(average_degree(n, m), 2),
        clustering_coefficient: round_to(clustering_coefficient(projection), 3),
        is_connected: n > 0 && components == 1,
        num_components: components,
        has_cycles: has_cycles(graph),
        most_central_node,
        max_centrality: round_to(max_centrality, 3),
        type_distribution: type_distribution(concepts),
        relationship_types: relationship_types(edges),
        avg_concept_quality: round_to(avg_quality, 3),
        high_quality_concepts: high_quality,
        quality_ratio: round_to(quality_ratio, 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digraph(n: u32, edges: &[(u32, u32)]) -> DiGraph<ConceptId, f32> {
        let mut g = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..n).map(|i| g.add_node(ConceptId(i))).collect();
        for (a, b) in edges {
            g.add_edge(nodes[*a as usize], nodes[*b as usize], 0.5);
        }
        g
    }

    #[test]
    fn test_empty_graph_defaults() {
        let g = digraph(0, &[]);
        let p = undirected_projection(&g);
        assert!(degree_centrality(&p).is_empty());
        assert_eq!(density(0, 0), 0.0);
        assert_eq!(average_degree(0, 0), 0.0);
        assert_eq!(clustering_coefficient(&p), 0.0);
        assert_eq!(component_count(&p), 0);
        assert!(!has_cycles(&g));
        assert_eq!(most_central(&[], &[]), None);
    }

    #[test]
    fn test_single_node() {
        let g = digraph(1, &[]);
        let p = undirected_projection(&g);
        assert_eq!(degree_centrality(&p), vec![0.0]);
        assert_eq!(component_count(&p), 1);
        assert_eq!(density(1, 0), 0.0);
    }

    #[test]
    fn test_triangle() {
        let g = digraph(3, &[(0, 1), (1, 2), (2, 0)]);
        let p = undirected_projection(&g);
        assert_eq!(degrees(&g), vec![2, 2, 2]);
        assert_eq!(degree_centrality(&p), vec![1.0, 1.0, 1.0]);
        assert!((clustering_coefficient(&p) - 1.0).abs() < 1e-6);
        assert_eq!(component_count(&p), 1);
        assert!(has_cycles(&g));
        assert!((density(3, 3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reciprocal_edges_count_one_neighbour() {
        let g = digraph(3, &[(0, 1), (1, 0)]);
        let p = undirected_projection(&g);
        assert_eq!(p.edge_count(), 1);
        assert_eq!(degrees(&g)[0], 2);
        assert_eq!(degree_centrality(&p)[0], 0.5);
        assert_eq!(component_count(&p), 2);
    }

    #[test]
    fn test_star_is_acyclic() {
        let g = digraph(4, &[(0, 1), (0, 2), (0, 3)]);
        let p = undirected_projection(&g);
        let centrality = degree_centrality(&p);
        assert_eq!(centrality[0], 1.0);
        assert_eq!(clustering_coefficient(&p), 0.0);
        assert!(!has_cycles(&g));

        let ids: Vec<ConceptId> = (0..4).map(ConceptId).collect();
        assert_eq!(most_central(&ids, &centrality), Some((ConceptId(0), 1.0)));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(1.666, 2), 1.67);
    }
}
