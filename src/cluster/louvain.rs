//! Iterative local optimization (Louvain-style local moving phase)

use std::collections::{HashMap, HashSet};

use crate::cluster::detection::{Partition, MIN_GAIN};
use crate::config::CohesionWeights;
use crate::graph::algorithms::{affinity_neighbors, jaccard, path_overlap};
use crate::graph::GraphView;

/// Working state of the local-move phase
struct LocalMoves<'v, 'a> {
    view: &'v GraphView<'a>,
    weights: CohesionWeights,
    resolution: f64,

    /// Community of each node
    community: Vec<usize>,

    /// Members of each community slot
    members: Vec<Vec<usize>>,

    /// Weighted degree sum of each community slot
    totals: Vec<f64>,
}

impl<'v, 'a> LocalMoves<'v, 'a> {
    fn new(view: &'v GraphView<'a>, weights: CohesionWeights, resolution: f64) -> Self {
        let n = view.node_count();
        Self {
            view,
            weights,
            resolution,
            community: (0..n).collect(),
            members: (0..n).map(|i| vec![i]).collect(),
            totals: view.adjacency.degrees.clone(),
        }
    }

    /// How well `node` fits `target`, counting the target without the node itself
    fn affinity(&self, node: usize, target: usize, link_weight: f64) -> f64 {
        let graph = &self.view.adjacency;
        let mut score = 0.0;

        if self.weights.link_strength > 0.0 && graph.total_weight > 0.0 {
            let m = graph.total_weight;
            let k_i = graph.weighted_degree(node);
            let mut total = self.totals[target];
            if self.community[node] == target {
                total -= k_i;
            }
            let gain = link_weight / m - self.resolution * total * k_i / (2.0 * m * m);
            score += self.weights.link_strength * gain;
        }

        let others = self.members[target].iter().copied().filter(|&m| m != node);

        if self.weights.shared_tags > 0.0 {
            let aggregate: HashSet<&str> = others
                .clone()
                .flat_map(|m| self.view.tags(m).iter().copied())
                .collect();
            score += self.weights.shared_tags * jaccard(self.view.tags(node), &aggregate);
        }

        if self.weights.folder_hierarchy > 0.0 && !self.view.path(node).is_empty() {
            let overlaps: Vec<f64> = others
                .filter(|&m| !self.view.path(m).is_empty())
                .map(|m| path_overlap(self.view.path(node), self.view.path(m)))
                .collect();
            if !overlaps.is_empty() {
                let mean = overlaps.iter().sum::<f64>() / overlaps.len() as f64;
                score += self.weights.folder_hierarchy * mean;
            }
        }

        score
    }

    fn relocate(&mut self, node: usize, target: usize) {
        let current = self.community[node];
        let k_i = self.view.adjacency.weighted_degree(node);

        self.members[current].retain(|&m| m != node);
        self.totals[current] -= k_i;

        self.members[target].push(node);
        self.totals[target] += k_i;
        self.community[node] = target;
    }

    /// One sweep over all nodes; returns the number of moves made
    fn pass(&mut self, neighbors: &[Vec<usize>]) -> usize {
        let mut moves = 0;

        for node in 0..self.community.len() {
            let current = self.community[node];

            let mut candidates: Vec<usize> = Vec::new();
            for &peer in &neighbors[node] {
                let c = self.community[peer];
                if c != current && !candidates.contains(&c) {
                    candidates.push(c);
                }
            }
            if candidates.is_empty() {
                continue;
            }

            let mut link_to: HashMap<usize, f64> = HashMap::new();
            for (dst, w) in self.view.adjacency.weighted_neighbors(node) {
                *link_to.entry(self.community[dst]).or_insert(0.0) += w;
            }
            let link = |c: usize| link_to.get(&c).copied().unwrap_or(0.0);

            let stay = self.affinity(node, current, link(current));

            // Strictly better only: ties keep the node where it is
            let mut best: Option<usize> = None;
            let mut best_gain = MIN_GAIN;
            for c in candidates {
                let gain = self.affinity(node, c, link(c)) - stay;
                if gain > best_gain {
                    best = Some(c);
                    best_gain = gain;
                }
            }

            if let Some(target) = best {
                self.relocate(node, target);
                moves += 1;
            }
        }

        moves
    }
}

/// Assign every node to a community by repeated greedy local moves.
///
/// Starts from singletons and stops after `max_passes` sweeps or the first
/// sweep without an improving move.
pub fn local_moving(
    view: &GraphView<'_>,
    weights: &CohesionWeights,
    resolution: f64,
    max_passes: usize,
) -> Partition {
    let neighbors = affinity_neighbors(view, weights);
    let mut state = LocalMoves::new(view, *weights, resolution);

    for pass in 0..max_passes {
        let moves = state.pass(&neighbors);
        log::debug!("Local moving pass {}: {} moves", pass + 1, moves);
        if moves == 0 {
            break;
        }
    }

    state.community.into_iter().map(Some).collect()
}
