//! Cohesion scorers
//!
//! Each scorer rates a candidate cluster along one signal and returns a
//! value in [0, 1]. They are pure functions of the member list and the
//! graph view.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::CohesionWeights;
use crate::graph::algorithms::{internal_links, jaccard, path_overlap};
use crate::graph::GraphView;

/// Reference window for temporal cohesion
pub const ONE_YEAR_MILLIS: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Internal links over possible pairs
pub fn link_cohesion(view: &GraphView<'_>, members: &[usize]) -> f64 {
    let n = members.len();
    if n < 2 {
        return 0.0;
    }

    let (links, _) = internal_links(&view.adjacency, members);
    let possible = n * (n - 1) / 2;

    (links as f64 / possible as f64).min(1.0)
}

/// Mean pairwise Jaccard similarity of member tag sets
pub fn tag_cohesion(view: &GraphView<'_>, members: &[usize]) -> f64 {
    if members.len() < 2 || members.iter().all(|&m| view.tags(m).is_empty()) {
        return 0.0;
    }

    mean(
        members
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| jaccard(view.tags(a), view.tags(b))),
    )
}

/// Mean pairwise path-prefix overlap among members that have a path
pub fn folder_cohesion(view: &GraphView<'_>, members: &[usize]) -> f64 {
    let with_path: Vec<usize> = members
        .iter()
        .copied()
        .filter(|&m| !view.path(m).is_empty())
        .collect();
    if with_path.len() < 2 {
        return 0.0;
    }

    mean(
        with_path
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| path_overlap(view.path(a), view.path(b))),
    )
}

/// One minus the creation-time span as a fraction of a year
pub fn temporal_cohesion(view: &GraphView<'_>, members: &[usize]) -> f64 {
    let (oldest, newest) = match members.iter().map(|&m| view.created_millis(m)).minmax().into_option() {
        Some(bounds) => bounds,
        None => return 0.0,
    };

    let span = (newest - oldest) as f64;
    (1.0 - span / ONE_YEAR_MILLIS).max(0.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// All four cohesion scores of one cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub link: f64,
    pub tag: f64,
    pub folder: f64,
    pub temporal: f64,
}

impl FactorScores {
    pub fn compute(view: &GraphView<'_>, members: &[usize]) -> Self {
        Self {
            link: link_cohesion(view, members),
            tag: tag_cohesion(view, members),
            folder: folder_cohesion(view, members),
            temporal: temporal_cohesion(view, members),
        }
    }

    /// Weighted mean of the four scores; zero when all weights are zero
    pub fn combined(&self, weights: &CohesionWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }

        let weighted = self.link * weights.link_strength
            + self.tag * weights.shared_tags
            + self.folder * weights.folder_hierarchy
            + self.temporal * weights.temporal_proximity;

        (weighted / total).clamp(0.0, 1.0)
    }
}
