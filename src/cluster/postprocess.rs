//! Partition post-processing: size bounds, orphans, quality

use crate::cluster::detection::{group_members, Partition};
use crate::cluster::metrics::{coverage, modularity};
use crate::graph::GraphView;

/// Clusters that survived the size bounds, plus quality figures
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPartition {
    /// Surviving clusters as node indices, largest first
    pub clusters: Vec<Vec<usize>>,

    /// Unassigned or dissolved nodes, ascending
    pub orphans: Vec<usize>,

    pub modularity: f64,
    pub coverage: f64,
}

/// Enforce minimum size and maximum count, then score the survivors.
///
/// Ties in size keep their detection order, so trimming always removes the
/// smallest and, among equals, the latest clusters.
pub fn post_process(
    view: &GraphView<'_>,
    partition: &Partition,
    min_cluster_size: usize,
    max_clusters: usize,
) -> ProcessedPartition {
    let n = view.node_count();
    let groups = group_members(partition);
    let detected = groups.len();

    let mut clusters: Vec<Vec<usize>> = groups
        .into_iter()
        .filter(|members| members.len() >= min_cluster_size.max(1))
        .collect();
    let undersized = detected - clusters.len();

    // Stable: equal sizes keep detection order
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    let trimmed = clusters.len().saturating_sub(max_clusters);
    clusters.truncate(max_clusters);

    let mut assigned = vec![false; n];
    for &member in clusters.iter().flatten() {
        assigned[member] = true;
    }
    let orphans: Vec<usize> = (0..n).filter(|&i| !assigned[i]).collect();

    log::info!(
        "Post-processing kept {} of {} clusters ({} undersized, {} over limit), {} orphans",
        clusters.len(),
        detected,
        undersized,
        trimmed,
        orphans.len()
    );

    let modularity = modularity(&view.adjacency, &clusters);
    let coverage = coverage(n, orphans.len());

    ProcessedPartition {
        clusters,
        orphans,
        modularity,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphSnapshot, Node};
    use chrono::Utc;

    fn view_of(n: usize) -> GraphSnapshot {
        let now = Utc::now();
        GraphSnapshot::new((0..n).map(|i| Node::new(format!("n{}", i), now)).collect(), Vec::new())
    }

    #[test]
    fn test_undersized_clusters_become_orphans() {
        let snapshot = view_of(6);
        let view = GraphView::new(&snapshot).unwrap();
        let partition: Partition = vec![Some(0), Some(0), Some(0), Some(1), None, Some(2)];

        let processed = post_process(&view, &partition, 2, 10);
        assert_eq!(processed.clusters, vec![vec![0, 1, 2]]);
        assert_eq!(processed.orphans, vec![3, 4, 5]);
        assert_eq!(processed.coverage, 0.5);
    }

    #[test]
    fn test_excess_clusters_trimmed_smallest_first() {
        let snapshot = view_of(9);
        let view = GraphView::new(&snapshot).unwrap();
        // sizes in detection order: 2, 3, 2, 2
        let partition: Partition = vec![
            Some(0), Some(0),
            Some(1), Some(1), Some(1),
            Some(2), Some(2),
            Some(3), Some(3),
        ];

        let processed = post_process(&view, &partition, 2, 2);
        assert_eq!(processed.clusters, vec![vec![2, 3, 4], vec![0, 1]]);
        assert_eq!(processed.orphans, vec![5, 6, 7, 8]);
    }
}
