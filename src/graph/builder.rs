//! Graph construction from a snapshot

use std::collections::HashMap;

use crate::error::{ClusterError, ClusterResult};
use crate::graph::compressed::WeightedGraph;
use crate::graph::snapshot::GraphSnapshot;

/// Builder that normalizes snapshot links into a `WeightedGraph`
pub struct GraphBuilder {
    /// Mapping from string IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Adjacency lists for each node, with weights
    adjacency_lists: Vec<Vec<(u32, f64)>>,

    /// Links dropped because an endpoint was unknown
    skipped_links: usize,

    /// Links dropped because both endpoints were the same node
    self_links: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            skipped_links: 0,
            self_links: 0,
        }
    }

    /// Register a node; ids must be unique
    pub fn add_node(&mut self, id: &str) -> ClusterResult<u32> {
        if self.id_to_index.contains_key(id) {
            return Err(ClusterError::DuplicateNode(id.to_string()));
        }

        let idx = self.adjacency_lists.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.adjacency_lists.push(Vec::new());

        Ok(idx)
    }

    /// Add an undirected edge between two registered nodes.
    ///
    /// Returns `Ok(false)` when the link was skipped (unknown endpoint or
    /// self-link).
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str, strength: f64) -> ClusterResult<bool> {
        if !strength.is_finite() || strength <= 0.0 {
            return Err(ClusterError::InvalidStrength {
                source_id: src_id.to_string(),
                target_id: dst_id.to_string(),
                strength,
            });
        }

        let (src, dst) = match (self.id_to_index.get(src_id), self.id_to_index.get(dst_id)) {
            (Some(&src), Some(&dst)) => (src, dst),
            _ => {
                log::warn!("Skipping link {} -> {}: unknown endpoint", src_id, dst_id);
                self.skipped_links += 1;
                return Ok(false);
            }
        };

        if src == dst {
            log::debug!("Skipping self-link on {}", src_id);
            self.self_links += 1;
            return Ok(false);
        }

        self.adjacency_lists[src as usize].push((dst, strength));
        self.adjacency_lists[dst as usize].push((src, strength));

        Ok(true)
    }

    /// Number of links dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped_links + self.self_links
    }

    /// Build the compressed graph and the id index.
    ///
    /// Parallel links between the same pair are merged by summing strength.
    pub fn build(mut self) -> (WeightedGraph, HashMap<String, u32>) {
        let node_count = self.adjacency_lists.len();
        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();

        let mut graph = WeightedGraph::with_capacity(node_count, edge_count);
        graph.offsets.push(0);

        let mut offset = 0u32;
        for list in &mut self.adjacency_lists {
            // Sort for binary search, then fold duplicates
            list.sort_by_key(|&(dst, _)| dst);

            let mut degree = 0.0;
            let mut last: Option<u32> = None;
            for &(dst, weight) in list.iter() {
                degree += weight;
                if last == Some(dst) {
                    if let Some(w) = graph.weights.last_mut() {
                        *w += weight;
                    }
                    continue;
                }
                graph.edges.push(dst);
                graph.weights.push(weight);
                offset += 1;
                last = Some(dst);
            }

            graph.offsets.push(offset);
            graph.degrees.push(degree);
        }

        graph.total_weight = graph.degrees.iter().sum::<f64>() / 2.0;

        (graph, self.id_to_index)
    }
}

/// Resolve a snapshot into a weighted graph, indexed by snapshot node order
pub fn build_from_snapshot(snapshot: &GraphSnapshot) -> ClusterResult<(WeightedGraph, HashMap<String, u32>)> {
    let mut builder = GraphBuilder::with_capacity(snapshot.nodes.len());

    for node in &snapshot.nodes {
        builder.add_node(&node.id)?;
    }

    for link in &snapshot.links {
        builder.add_edge(link.source.id(), link.target.id(), link.strength)?;
    }

    if builder.skipped() > 0 {
        log::info!("Dropped {} of {} links during normalization", builder.skipped(), snapshot.links.len());
    }

    Ok(builder.build())
}
