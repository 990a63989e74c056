//! Indexed, read-only view over a snapshot used by every clustering stage

use std::collections::{HashMap, HashSet};

use crate::error::ClusterResult;
use crate::graph::builder::build_from_snapshot;
use crate::graph::compressed::WeightedGraph;
use crate::graph::snapshot::{GraphSnapshot, Node, Position};

/// Snapshot plus the derived structures the detectors and scorers share.
///
/// Node indices follow the order of `snapshot.nodes`.
pub struct GraphView<'a> {
    snapshot: &'a GraphSnapshot,

    /// Weighted undirected adjacency
    pub adjacency: WeightedGraph,

    id_to_index: HashMap<String, u32>,

    /// Normalized tag set per node (leading `#` stripped)
    tag_sets: Vec<HashSet<&'a str>>,

    /// Path segments per node
    path_segments: Vec<Vec<&'a str>>,

    /// Creation time per node, epoch milliseconds
    timestamps: Vec<i64>,
}

impl<'a> GraphView<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> ClusterResult<Self> {
        let (adjacency, id_to_index) = build_from_snapshot(snapshot)?;
        log::debug!(
            "Built adjacency with {} nodes, {} links ({} bytes)",
            adjacency.node_count,
            adjacency.edge_count(),
            adjacency.memory_usage()
        );

        let tag_sets = snapshot
            .nodes
            .iter()
            .map(|node| {
                node.tags
                    .iter()
                    .map(|t| t.trim().trim_start_matches('#'))
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .collect();

        let path_segments = snapshot.nodes.iter().map(Node::path_segments).collect();
        let timestamps = snapshot.nodes.iter().map(|n| n.created.timestamp_millis()).collect();

        Ok(Self {
            snapshot,
            adjacency,
            id_to_index,
            tag_sets,
            path_segments,
            timestamps,
        })
    }

    pub fn node_count(&self) -> usize {
        self.snapshot.nodes.len()
    }

    pub fn node(&self, idx: usize) -> &'a Node {
        &self.snapshot.nodes[idx]
    }

    pub fn node_id(&self, idx: usize) -> &'a str {
        &self.snapshot.nodes[idx].id
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).map(|&i| i as usize)
    }

    pub fn tags(&self, idx: usize) -> &HashSet<&'a str> {
        &self.tag_sets[idx]
    }

    pub fn path(&self, idx: usize) -> &[&'a str] {
        &self.path_segments[idx]
    }

    /// Parent folder segments (path without its last segment)
    pub fn folder(&self, idx: usize) -> &[&'a str] {
        let segments = &self.path_segments[idx];
        &segments[..segments.len().saturating_sub(1)]
    }

    pub fn created_millis(&self, idx: usize) -> i64 {
        self.timestamps[idx]
    }

    pub fn position(&self, idx: usize) -> Option<Position> {
        self.snapshot.nodes[idx].position
    }
}
