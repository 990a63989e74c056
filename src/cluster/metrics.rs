//! Partition quality and result statistics

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterType, ClusteringResult};
use crate::graph::WeightedGraph;

/// Newman modularity of a set of disjoint clusters, clamped to [0, 1].
///
/// Nodes outside every cluster contribute their edges to the total but
/// belong to no cluster term.
pub fn modularity(graph: &WeightedGraph, clusters: &[Vec<usize>]) -> f64 {
    let m = graph.total_weight;
    if m <= 0.0 {
        return 0.0;
    }

    let q: f64 = clusters
        .iter()
        .map(|members| {
            let member_set: HashSet<usize> = members.iter().copied().collect();
            let mut internal = 0.0;
            let mut degree = 0.0;
            for &src in members {
                degree += graph.weighted_degree(src);
                for (dst, w) in graph.weighted_neighbors(src) {
                    if src < dst && member_set.contains(&dst) {
                        internal += w;
                    }
                }
            }
            internal / m - (degree / (2.0 * m)).powi(2)
        })
        .sum();

    q.clamp(0.0, 1.0)
}

/// Share of nodes that ended up in a cluster
pub fn coverage(total_nodes: usize, orphan_count: usize) -> f64 {
    if total_nodes == 0 {
        return 0.0;
    }
    (total_nodes.saturating_sub(orphan_count)) as f64 / total_nodes as f64
}

/// Summary numbers for a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatistics {
    pub cluster_count: usize,
    pub clustered_nodes: usize,
    pub orphan_count: usize,
    pub largest_cluster_size: usize,
    pub smallest_cluster_size: usize,
    pub avg_cluster_size: f64,
    pub avg_strength: f64,
    pub type_distribution: BTreeMap<ClusterType, usize>,
}

pub fn statistics(result: &ClusteringResult) -> ClusterStatistics {
    let sizes: Vec<usize> = result.clusters.iter().map(|c| c.size()).collect();
    let clustered_nodes: usize = sizes.iter().sum();
    let count = result.clusters.len();
    let divisor = if count == 0 { 1.0 } else { count as f64 };

    let mut type_distribution = BTreeMap::new();
    for cluster in &result.clusters {
        *type_distribution.entry(cluster.cluster_type).or_insert(0) += 1;
    }

    ClusterStatistics {
        cluster_count: count,
        clustered_nodes,
        orphan_count: result.orphan_nodes.len(),
        largest_cluster_size: sizes.iter().copied().max().unwrap_or(0),
        smallest_cluster_size: sizes.iter().copied().min().unwrap_or(0),
        avg_cluster_size: clustered_nodes as f64 / divisor,
        avg_strength: result.clusters.iter().map(|c| c.strength).sum::<f64>() / divisor,
        type_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn two_triangles() -> WeightedGraph {
        let mut builder = GraphBuilder::with_capacity(6);
        for i in 0..6 {
            builder.add_node(&format!("n{}", i)).unwrap();
        }
        for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
            builder.add_edge(&format!("n{}", a), &format!("n{}", b), 1.0).unwrap();
        }
        builder.build().0
    }

    #[test]
    fn test_modularity_of_two_triangles() {
        let graph = two_triangles();
        let q = modularity(&graph, &[vec![0, 1, 2], vec![3, 4, 5]]);
        assert!((q - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_modularity_is_clamped() {
        let graph = two_triangles();
        // One cluster holding everything scores exactly zero
        assert_eq!(modularity(&graph, &[vec![0, 1, 2, 3, 4, 5]]), 0.0);
        // A bad split would be negative
        assert_eq!(modularity(&graph, &[vec![0, 3], vec![1, 4], vec![2, 5]]), 0.0);
        assert_eq!(modularity(&WeightedGraph::default(), &[]), 0.0);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(10, 0), 1.0);
        assert_eq!(coverage(10, 4), 0.6);
        assert_eq!(coverage(0, 0), 0.0);
    }
}
