//! Cluster analysis module

pub mod agglomerative;
pub mod cohesion;
pub mod detection;
pub mod louvain;
pub mod materialize;
pub mod metrics;
pub mod postprocess;
pub mod refinement;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::CohesionWeights;
use crate::graph::{GraphSnapshot, Position};

pub use metrics::ClusterStatistics;

/// Dominant cohesion signal of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    TagBased,
    FolderBased,
    LinkDense,
    Temporal,
    Community,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::TagBased => "tag-based",
            ClusterType::FolderBased => "folder-based",
            ClusterType::LinkDense => "link-dense",
            ClusterType::Temporal => "temporal",
            ClusterType::Community => "community",
        }
    }

    /// Display colour used by renderers
    pub fn color(&self) -> &'static str {
        match self {
            ClusterType::TagBased => "#4ade80",
            ClusterType::FolderBased => "#60a5fa",
            ClusterType::LinkDense => "#a78bfa",
            ClusterType::Temporal => "#fb923c",
            ClusterType::Community => "#f472b6",
        }
    }
}

impl std::fmt::Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A materialized cluster ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Unique identifier within one result
    pub id: String,

    /// Member node ids
    pub members: Vec<String>,

    /// Classification
    #[serde(rename = "type")]
    pub cluster_type: ClusterType,

    /// Weighted cohesion in [0, 1]
    pub strength: f64,

    /// Human-readable label
    pub label: String,

    /// Region centre
    pub centroid: Position,

    /// Region radius
    pub radius: f64,

    /// Display colour keyed by type
    pub color: String,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Diagnostic payload attached when debug mode is on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub cluster_count: usize,
    pub modularity: f64,
    pub coverage: f64,
    pub orphan_count: usize,
    pub weights: CohesionWeights,
    pub clusters: Vec<DebugCluster>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugCluster {
    pub id: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub cluster_type: ClusterType,
    pub strength: f64,
    pub label: String,
}

impl DebugReport {
    pub fn from_result(result: &ClusteringResult, weights: CohesionWeights) -> Self {
        Self {
            cluster_count: result.clusters.len(),
            modularity: result.modularity,
            coverage: result.coverage,
            orphan_count: result.orphan_nodes.len(),
            weights,
            clusters: result
                .clusters
                .iter()
                .map(|c| DebugCluster {
                    id: c.id.clone(),
                    size: c.size(),
                    cluster_type: c.cluster_type,
                    strength: c.strength,
                    label: c.label.clone(),
                })
                .collect(),
        }
    }
}

/// Immutable outcome of one clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringResult {
    /// Surviving clusters, largest first
    pub clusters: Vec<Cluster>,

    /// Newman modularity of the surviving partition, clamped to [0, 1]
    pub modularity: f64,

    /// Fraction of nodes assigned to some cluster
    pub coverage: f64,

    /// Nodes in no surviving cluster, in snapshot order
    pub orphan_nodes: Vec<String>,

    /// Present only when debug mode was on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugReport>,
}

impl ClusteringResult {
    /// Result with no clusters where every node is an orphan
    pub fn empty(snapshot: &GraphSnapshot) -> Self {
        Self {
            clusters: Vec::new(),
            modularity: 0.0,
            coverage: 0.0,
            orphan_nodes: snapshot.nodes.iter().map(|n| n.id.clone()).collect(),
            debug: None,
        }
    }

    /// Clustered plus orphaned node count
    pub fn total_nodes(&self) -> usize {
        self.clusters.iter().map(Cluster::size).sum::<usize>() + self.orphan_nodes.len()
    }

    /// Cluster containing a node, if any
    pub fn cluster_for_node(&self, node_id: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m == node_id))
    }

    /// Node id to cluster id for every clustered node
    pub fn assignment(&self) -> HashMap<String, String> {
        self.clusters
            .iter()
            .flat_map(|c| c.members.iter().map(move |m| (m.clone(), c.id.clone())))
            .collect()
    }

    pub fn statistics(&self) -> ClusterStatistics {
        metrics::statistics(self)
    }
}
