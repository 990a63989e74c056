//! Pairwise similarity and neighbourhood helpers

use std::collections::{HashMap, HashSet};

use crate::config::CohesionWeights;
use crate::graph::compressed::WeightedGraph;
use crate::graph::view::GraphView;

/// Jaccard similarity of two tag sets; zero when both are empty
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Common leading segments divided by the longer path's length
pub fn path_overlap(a: &[&str], b: &[&str]) -> f64 {
    let longest = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    common as f64 / longest as f64
}

/// Count undirected links and their total weight among `members`
pub fn internal_links(graph: &WeightedGraph, members: &[usize]) -> (usize, f64) {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    let mut links = 0;
    let mut weight = 0.0;

    for &src in members {
        for (dst, w) in graph.weighted_neighbors(src) {
            // Count each undirected edge once
            if src < dst && member_set.contains(&dst) {
                links += 1;
                weight += w;
            }
        }
    }

    (links, weight)
}

/// Nodes each node may be grouped with during local moves.
///
/// Always the link neighbours; with a positive tag weight also nodes
/// sharing a tag, and with a positive folder weight nodes in the same
/// parent folder. Lists are sorted by node index and deduplicated.
pub fn affinity_neighbors(view: &GraphView<'_>, weights: &CohesionWeights) -> Vec<Vec<usize>> {
    let n = view.node_count();

    let mut by_tag: HashMap<&str, Vec<usize>> = HashMap::new();
    if weights.shared_tags > 0.0 {
        for idx in 0..n {
            for &tag in view.tags(idx) {
                by_tag.entry(tag).or_default().push(idx);
            }
        }
    }

    let mut by_folder: HashMap<&[&str], Vec<usize>> = HashMap::new();
    if weights.folder_hierarchy > 0.0 {
        for idx in 0..n {
            let folder = view.folder(idx);
            if !folder.is_empty() {
                by_folder.entry(folder).or_default().push(idx);
            }
        }
    }

    (0..n)
        .map(|idx| {
            let mut neighbors: Vec<usize> = view.adjacency.neighbors(idx).iter().map(|&d| d as usize).collect();

            for tag in view.tags(idx) {
                if let Some(peers) = by_tag.get(tag) {
                    neighbors.extend(peers.iter().copied().filter(|&p| p != idx));
                }
            }

            if let Some(peers) = by_folder.get(view.folder(idx)) {
                neighbors.extend(peers.iter().copied().filter(|&p| p != idx));
            }

            neighbors.sort_unstable();
            neighbors.dedup();
            neighbors
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::snapshot::{GraphSnapshot, Link, Node};
    use chrono::Utc;

    #[test]
    fn test_jaccard() {
        let a: HashSet<&str> = ["rust", "graphs"].into_iter().collect();
        let b: HashSet<&str> = ["rust", "audio"].into_iter().collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_path_overlap() {
        assert!((path_overlap(&["a", "b", "c"], &["a", "b"]) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(path_overlap(&["x"], &["y"]), 0.0);
        assert_eq!(path_overlap(&[], &["y"]), 0.0);
    }

    #[test]
    fn test_affinity_neighbors_respect_weights() {
        let now = Utc::now();
        let snapshot = GraphSnapshot::new(
            vec![
                Node::new("a", now).with_tags(["music"]).with_path("notes/a.md"),
                Node::new("b", now).with_tags(["#music"]),
                Node::new("c", now).with_path("notes/c.md"),
                Node::new("d", now),
            ],
            vec![Link::new("a", "d", 1.0)],
        );
        let view = GraphView::new(&snapshot).unwrap();

        let links_only = CohesionWeights {
            link_strength: 1.0,
            shared_tags: 0.0,
            folder_hierarchy: 0.0,
            temporal_proximity: 0.0,
        };
        assert_eq!(affinity_neighbors(&view, &links_only)[0], vec![3]);

        let all = CohesionWeights::default();
        assert_eq!(affinity_neighbors(&view, &all)[0], vec![1, 2, 3]);
        assert_eq!(affinity_neighbors(&view, &all)[1], vec![0]);
    }
}
