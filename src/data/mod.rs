//! Graph snapshot loading

pub mod json;
pub mod parquet;

use anyhow::Result;

use crate::graph::GraphSnapshot;

/// Load a snapshot, choosing the reader by file extension
pub fn load_snapshot(input: &str, nodes: Option<&str>) -> Result<GraphSnapshot> {
    if input.ends_with(".parquet") {
        parquet::load_snapshot(input, nodes)
    } else {
        if nodes.is_some() {
            log::warn!("Ignoring node table for JSON snapshot {}", input);
        }
        json::load_snapshot(input)
    }
}
