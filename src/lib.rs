//! Core library for the graph clustering engine
//!
//! Partitions a weighted document graph into cohesive, typed clusters for
//! visualization. See [`session::ClusteringSession`] for the entry point.

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod session;
pub mod storage;
pub mod viz;

pub use anyhow::{anyhow, Result};
pub use cluster::{Cluster, ClusterType, ClusteringResult};
pub use config::{Algorithm, ClusteringSettings, CohesionWeights, Thresholds};
pub use error::{ClusterError, ClusterResult};
pub use graph::{GraphSnapshot, Link, LinkEndpoint, Node, Position};
pub use session::{cluster_snapshot, ClusteringSession};
