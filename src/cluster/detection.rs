//! Community detection strategy dispatch

use std::collections::HashMap;

use crate::cluster::agglomerative::greedy_merge;
use crate::cluster::louvain::local_moving;
use crate::cluster::refinement::refine;
use crate::config::{Algorithm, ClusteringSettings};
use crate::graph::GraphView;

/// Raw node to community assignment, indexed by node; `None` is unassigned.
///
/// Community numbers are opaque slots local to one run.
pub type Partition = Vec<Option<usize>>;

/// Gains at or below this are treated as no improvement
pub(crate) const MIN_GAIN: f64 = 1e-10;

/// Run the configured detector over the graph
pub fn detect_communities(view: &GraphView<'_>, settings: &ClusteringSettings) -> Partition {
    log::info!(
        "Detecting communities with {} over {} nodes and {} links",
        settings.algorithm.as_str(),
        view.node_count(),
        view.adjacency.edge_count()
    );

    let thresholds = &settings.thresholds;
    match settings.algorithm {
        Algorithm::Louvain => local_moving(view, &settings.weights, settings.resolution, thresholds.max_passes),
        Algorithm::Agglomerative => greedy_merge(view, settings.resolution),
        Algorithm::Hybrid => {
            let partition = local_moving(view, &settings.weights, settings.resolution, thresholds.max_passes);
            refine(view, &partition, settings)
        }
    }
}

/// Group nodes by community, in order of each community's first member.
///
/// Members within a group are in ascending node order.
pub fn group_members(partition: &Partition) -> Vec<Vec<usize>> {
    let mut slot_to_group: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (node, slot) in partition.iter().enumerate() {
        let Some(slot) = slot else { continue };
        let group = *slot_to_group.entry(*slot).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(node);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_members_orders_by_first_appearance() {
        let partition: Partition = vec![Some(7), None, Some(2), Some(7), Some(2), Some(9)];
        assert_eq!(group_members(&partition), vec![vec![0, 3], vec![2, 4], vec![5]]);
    }
}
