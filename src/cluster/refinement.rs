//! Multi-factor refinement for the hybrid strategy

use crate::cluster::cohesion::FactorScores;
use crate::cluster::detection::{group_members, Partition};
use crate::config::ClusteringSettings;
use crate::graph::GraphView;

/// Split loosely held communities in two.
///
/// A community whose weighted cohesion is below the split threshold and
/// which holds more than twice the minimum cluster size is bisected by
/// member order. Halves are not refined again.
pub fn refine(view: &GraphView<'_>, partition: &Partition, settings: &ClusteringSettings) -> Partition {
    let min_size = settings.min_cluster_size.max(1);
    let mut refined: Partition = vec![None; partition.len()];
    let mut next_slot = 0;
    let mut splits = 0;

    let mut assign = |members: &[usize], refined: &mut Partition| {
        for &m in members {
            refined[m] = Some(next_slot);
        }
        next_slot += 1;
    };

    for members in group_members(partition) {
        let cohesion = FactorScores::compute(view, &members).combined(&settings.weights);

        if cohesion < settings.thresholds.split_cohesion && members.len() > 2 * min_size {
            let (left, right) = members.split_at(members.len() / 2);
            log::debug!(
                "Splitting community of {} (cohesion {:.3}) into {} + {}",
                members.len(),
                cohesion,
                left.len(),
                right.len()
            );
            assign(left, &mut refined);
            assign(right, &mut refined);
            splits += 1;
        } else {
            assign(&members, &mut refined);
        }
    }

    if splits > 0 {
        log::info!("Refinement split {} low-cohesion communities", splits);
    }

    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, CohesionWeights};
    use crate::graph::{GraphSnapshot, Link, Node};
    use chrono::{Duration, Utc};

    fn settings(min_cluster_size: usize) -> ClusteringSettings {
        ClusteringSettings {
            algorithm: Algorithm::Hybrid,
            min_cluster_size,
            weights: CohesionWeights {
                link_strength: 1.0,
                shared_tags: 0.0,
                folder_hierarchy: 0.0,
                temporal_proximity: 0.0,
            },
            ..ClusteringSettings::default()
        }
    }

    #[test]
    fn test_sparse_large_community_is_bisected() {
        // A path of 8 nodes has link cohesion 7/28 = 0.25
        let now = Utc::now();
        let nodes = (0..8).map(|i| Node::new(format!("n{}", i), now - Duration::days(i))).collect();
        let links = (0..7)
            .map(|i| Link::new(format!("n{}", i), format!("n{}", i + 1), 1.0))
            .collect();
        let snapshot = GraphSnapshot::new(nodes, links);
        let view = GraphView::new(&snapshot).unwrap();

        let partition: Partition = vec![Some(0); 8];
        let refined = refine(&view, &partition, &settings(3));
        assert_eq!(
            group_members(&refined),
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]
        );
    }

    #[test]
    fn test_small_or_cohesive_communities_are_kept() {
        let now = Utc::now();
        let nodes = (0..8).map(|i| Node::new(format!("n{}", i), now)).collect();
        let links = (0..7)
            .map(|i| Link::new(format!("n{}", i), format!("n{}", i + 1), 1.0))
            .collect();
        let snapshot = GraphSnapshot::new(nodes, links);
        let view = GraphView::new(&snapshot).unwrap();

        // 8 is not more than twice 4
        let partition: Partition = vec![Some(0); 8];
        let refined = refine(&view, &partition, &settings(4));
        assert_eq!(group_members(&refined).len(), 1);

        // Three consecutive path nodes have cohesion 2/3
        let partition: Partition = vec![Some(1), Some(1), Some(1), None, None, None, None, None];
        let refined = refine(&view, &partition, &settings(1));
        assert_eq!(group_members(&refined), vec![vec![0, 1, 2]]);
    }
}
