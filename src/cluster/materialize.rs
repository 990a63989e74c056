//! Turn surviving node groups into typed, labelled, positioned clusters

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;

use crate::cluster::cohesion::FactorScores;
use crate::cluster::{Cluster, ClusterType};
use crate::config::{ClusteringSettings, CohesionWeights, Thresholds};
use crate::graph::{GraphView, Position};

/// Spread of hashed pseudo-positions around the origin
const PSEUDO_POSITION_SPAN: u32 = 1000;

/// Radius padding: base plus a term growing with sqrt(member count)
const BASE_PADDING: f64 = 20.0;
const PADDING_PER_SQRT_MEMBER: f64 = 6.0;

/// Radius floor, also scaled by sqrt(member count)
const MIN_RADIUS: f64 = 30.0;
const MIN_RADIUS_PER_SQRT_MEMBER: f64 = 8.0;

/// Most tags shown in a tag-based label
const MAX_LABEL_TAGS: usize = 3;

/// Build a `Cluster` for each group; ids follow group order
pub fn materialize(
    view: &GraphView<'_>,
    groups: &[Vec<usize>],
    settings: &ClusteringSettings,
    now: DateTime<Utc>,
) -> Vec<Cluster> {
    groups
        .iter()
        .enumerate()
        .map(|(i, members)| {
            let scores = FactorScores::compute(view, members);
            let cluster_type = classify(&scores, members.len(), &settings.weights, &settings.thresholds);
            let (centroid, radius) = geometry(view, members);

            Cluster {
                id: format!("cluster-{}", i),
                members: members.iter().map(|&m| view.node_id(m).to_string()).collect(),
                cluster_type,
                strength: scores.combined(&settings.weights),
                label: label(view, members, cluster_type, now),
                centroid,
                radius,
                color: cluster_type.color().to_string(),
            }
        })
        .collect()
}

/// Pick the dominant signal, falling back to a size/connectivity heuristic
pub fn classify(
    scores: &FactorScores,
    size: usize,
    weights: &CohesionWeights,
    thresholds: &Thresholds,
) -> ClusterType {
    let boosts = &thresholds.boosts;
    let candidates = [
        (ClusterType::TagBased, scores.tag * weights.shared_tags * boosts.tag),
        (ClusterType::LinkDense, scores.link * weights.link_strength * boosts.link),
        (ClusterType::FolderBased, scores.folder * weights.folder_hierarchy * boosts.folder),
        (ClusterType::Temporal, scores.temporal * weights.temporal_proximity * boosts.temporal),
    ];

    // First maximum wins on ties
    let (best_type, best_score) = candidates
        .iter()
        .copied()
        .fold((ClusterType::Community, f64::NEG_INFINITY), |best, cand| {
            if cand.1 > best.1 {
                cand
            } else {
                best
            }
        });

    if best_score > thresholds.type_cutoff {
        return best_type;
    }

    if size >= thresholds.community_size_hint {
        ClusterType::Community
    } else if scores.link > thresholds.link_dense_cutoff {
        ClusterType::LinkDense
    } else {
        ClusterType::Community
    }
}

/// 31-multiplier string hash over UTF-16 code units
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Stable stand-in position for clusters with no laid-out members
pub fn pseudo_position(id: &str) -> Position {
    let h = string_hash(id).unsigned_abs();
    let half = (PSEUDO_POSITION_SPAN / 2) as f64;
    Position::new(
        (h % PSEUDO_POSITION_SPAN) as f64 - half,
        ((h / PSEUDO_POSITION_SPAN) % PSEUDO_POSITION_SPAN) as f64 - half,
    )
}

/// Centroid and padded radius of a member group
pub fn geometry(view: &GraphView<'_>, members: &[usize]) -> (Position, f64) {
    let positions: Vec<Position> = members.iter().filter_map(|&m| view.position(m)).collect();

    let centroid = if positions.is_empty() {
        members
            .first()
            .map(|&m| pseudo_position(view.node_id(m)))
            .unwrap_or_default()
    } else {
        let count = positions.len() as f64;
        Position::new(
            positions.iter().map(|p| p.x).sum::<f64>() / count,
            positions.iter().map(|p| p.y).sum::<f64>() / count,
        )
    };

    let spread = positions
        .iter()
        .map(|p| p.distance(&centroid))
        .fold(0.0, f64::max);
    let root = (members.len() as f64).sqrt();
    let padded = spread + BASE_PADDING + PADDING_PER_SQRT_MEMBER * root;
    let floor = MIN_RADIUS + MIN_RADIUS_PER_SQRT_MEMBER * root;

    (centroid, padded.max(floor))
}

/// Type-specific human-readable label
pub fn label(view: &GraphView<'_>, members: &[usize], cluster_type: ClusterType, now: DateTime<Utc>) -> String {
    let specific = match cluster_type {
        ClusterType::TagBased => tag_label(view, members),
        ClusterType::FolderBased => folder_label(view, members),
        ClusterType::Temporal => temporal_label(view, members, now),
        ClusterType::LinkDense | ClusterType::Community => None,
    };

    specific.unwrap_or_else(|| format!("Cluster ({} nodes)", members.len()))
}

/// Tags carried by at least half the members, most common first
fn tag_label(view: &GraphView<'_>, members: &[usize]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &m in members {
        for &tag in view.tags(m) {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let common = counts
        .into_iter()
        .filter(|&(_, count)| count * 2 >= members.len())
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(MAX_LABEL_TAGS)
        .map(|(tag, _)| format!("#{}", tag))
        .join(", ");

    (!common.is_empty()).then_some(common)
}

/// Longest common leading path shared by members with a path
fn folder_label(view: &GraphView<'_>, members: &[usize]) -> Option<String> {
    let mut paths = members.iter().map(|&m| view.path(m)).filter(|p| !p.is_empty());
    let first = paths.next()?;

    let common = paths.fold(first.len(), |len, path| {
        first.iter().zip(path).take(len).take_while(|(a, b)| a == b).count()
    });

    (common > 0).then(|| first[..common].join("/"))
}

/// Recency bucket relative to `now`, or an explicit date range
fn temporal_label(view: &GraphView<'_>, members: &[usize], now: DateTime<Utc>) -> Option<String> {
    let (oldest, newest) = members
        .iter()
        .map(|&m| view.node(m).created)
        .minmax()
        .into_option()?;

    let age = now.signed_duration_since(oldest);
    let bucket = if age <= Duration::days(1) {
        "Today".to_string()
    } else if age <= Duration::days(7) {
        "This Week".to_string()
    } else if age <= Duration::days(30) {
        "This Month".to_string()
    } else {
        let from = oldest.format("%b %d, %Y").to_string();
        let to = newest.format("%b %d, %Y").to_string();
        if from == to {
            from
        } else {
            format!("{} - {}", from, to)
        }
    };

    Some(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphSnapshot, Node};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_classify_prefers_boosted_signal() {
        let weights = CohesionWeights::default();
        let thresholds = Thresholds::default();
        let scores = FactorScores {
            link: 0.5,
            tag: 0.5,
            folder: 0.5,
            temporal: 1.0,
        };
        // link 0.5*0.4*1.5 = 0.3 beats tag 0.18, folder 0.1, temporal 0.1
        assert_eq!(classify(&scores, 4, &weights, &thresholds), ClusterType::LinkDense);
    }

    #[test]
    fn test_classify_fallbacks() {
        let weights = CohesionWeights::default();
        let thresholds = Thresholds::default();
        let weak = FactorScores {
            link: 0.2,
            tag: 0.0,
            folder: 0.0,
            temporal: 0.0,
        };
        // 0.2*0.4*1.5 = 0.12 is under the cutoff
        assert_eq!(classify(&weak, 4, &weights, &thresholds), ClusterType::LinkDense);
        assert_eq!(classify(&weak, 12, &weights, &thresholds), ClusterType::Community);
        assert_eq!(
            classify(&FactorScores::default(), 4, &weights, &thresholds),
            ClusterType::Community
        );
    }

    #[test]
    fn test_pseudo_position_is_stable() {
        assert_eq!(pseudo_position("notes/a.md"), pseudo_position("notes/a.md"));
        assert_ne!(pseudo_position("notes/a.md"), pseudo_position("notes/b.md"));
        let p = pseudo_position("anything");
        assert!(p.x >= -500.0 && p.x < 500.0);
        assert!(p.y >= -500.0 && p.y < 500.0);
        assert_eq!(string_hash("abc"), 96354);
    }

    #[test]
    fn test_geometry_uses_positioned_members_only() {
        let t = now();
        let snapshot = GraphSnapshot::new(
            vec![
                Node::new("a", t).at(0.0, 0.0),
                Node::new("b", t).at(100.0, 0.0),
                Node::new("c", t),
                Node::new("d", t),
            ],
            Vec::new(),
        );
        let view = GraphView::new(&snapshot).unwrap();

        let (centroid, radius) = geometry(&view, &[0, 1, 2]);
        assert_eq!(centroid, Position::new(50.0, 0.0));
        assert!((radius - (50.0 + 20.0 + 6.0 * 3f64.sqrt())).abs() < 1e-9);

        let (pseudo, floor) = geometry(&view, &[2, 3]);
        assert_eq!(pseudo, pseudo_position("c"));
        assert!((floor - (30.0 + 8.0 * 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_labels() {
        let t = now();
        let snapshot = GraphSnapshot::new(
            vec![
                Node::new("a", t - Duration::hours(2)).with_tags(["ambient", "drone"]).with_path("music/ambient/a.md"),
                Node::new("b", t - Duration::hours(5)).with_tags(["ambient"]).with_path("music/ambient/b.md"),
                Node::new("c", t - Duration::hours(1)).with_tags(["noise"]).with_path("music/noise/c.md"),
                Node::new("d", Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap()),
                Node::new("e", Utc.with_ymd_and_hms(2023, 3, 9, 0, 0, 0).unwrap()),
            ],
            Vec::new(),
        );
        let view = GraphView::new(&snapshot).unwrap();

        assert_eq!(label(&view, &[0, 1, 2], ClusterType::TagBased, t), "#ambient");
        assert_eq!(label(&view, &[0, 1], ClusterType::TagBased, t), "#ambient, #drone");
        assert_eq!(label(&view, &[0, 1, 2], ClusterType::FolderBased, t), "music");
        assert_eq!(label(&view, &[0, 1], ClusterType::FolderBased, t), "music/ambient");
        assert_eq!(label(&view, &[0, 1, 2], ClusterType::Temporal, t), "Today");
        assert_eq!(label(&view, &[3, 4], ClusterType::Temporal, t), "Jan 05, 2023 - Mar 09, 2023");
        assert_eq!(label(&view, &[3, 4], ClusterType::Community, t), "Cluster (2 nodes)");
        assert_eq!(label(&view, &[3, 4], ClusterType::FolderBased, t), "Cluster (2 nodes)");
    }
}
