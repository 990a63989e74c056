//! Weighted undirected adjacency in compressed sparse row form

use std::mem;

/// Compressed sparse representation of an undirected weighted graph.
///
/// Every undirected edge is stored twice, once per endpoint, so neighbour
/// scans never need a reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] is the edge range of node i
    pub offsets: Vec<u32>,

    /// Concatenated, per-node sorted neighbour lists
    pub edges: Vec<u32>,

    /// Edge weights, parallel to `edges`
    pub weights: Vec<f64>,

    /// Weighted degree of each node
    pub degrees: Vec<f64>,

    /// Sum of weights over undirected edges
    pub total_weight: f64,
}

impl WeightedGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count),
            weights: Vec::with_capacity(edge_count),
            degrees: Vec::with_capacity(node_count),
            total_weight: 0.0,
        }
    }

    /// Neighbours of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Neighbours paired with edge weights
    pub fn weighted_neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        self.edges[start..end]
            .iter()
            .zip(&self.weights[start..end])
            .map(|(&dst, &w)| (dst as usize, w))
    }

    /// Weight of the edge between two nodes, if any
    pub fn edge_weight(&self, src: usize, dst: usize) -> Option<f64> {
        let start = self.offsets[src] as usize;
        self.neighbors(src)
            .binary_search(&(dst as u32))
            .ok()
            .map(|pos| self.weights[start + pos])
    }

    pub fn has_edge(&self, src: usize, dst: usize) -> bool {
        self.neighbors(src).binary_search(&(dst as u32)).is_ok()
    }

    /// Number of distinct neighbours
    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Sum of incident edge weights
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.degrees[node]
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>()
            + self.offsets.capacity() * mem::size_of::<u32>()
            + self.edges.capacity() * mem::size_of::<u32>()
            + self.weights.capacity() * mem::size_of::<f64>()
            + self.degrees.capacity() * mem::size_of::<f64>()
    }
}
