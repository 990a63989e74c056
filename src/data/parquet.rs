//! Parquet node and link tables

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::error::ClusterError;
use crate::graph::{GraphSnapshot, Link, Node, Position};

fn read_frame(path: &str) -> Result<DataFrame> {
    log::info!("Reading parquet file: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(anyhow::anyhow!("File not found: {}", path));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    log::debug!("File schema: {:?}", df.schema());

    Ok(df)
}

fn required<'a>(df: &'a DataFrame, name: &str, path: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| {
        ClusterError::MissingColumn {
            column: name.to_string(),
            path: path.to_string(),
        }
        .into()
    })
}

/// Load links from a table with `Source`, `Target` and optional `Strength`
pub fn load_links(path: &str) -> Result<Vec<Link>> {
    let df = read_frame(path)?;

    let source_col = required(&df, "Source", path)?.str()?;
    let target_col = required(&df, "Target", path)?.str()?;
    let strength = match df.column("Strength") {
        Ok(col) => Some(col.cast(&DataType::Float64)?),
        Err(_) => None,
    };
    let strength_col = match &strength {
        Some(col) => Some(col.f64()?),
        None => None,
    };

    let mut links = Vec::with_capacity(df.height());
    let mut skipped = 0;

    for i in 0..df.height() {
        let (Some(src), Some(dst)) = (source_col.get(i), target_col.get(i)) else {
            skipped += 1;
            continue;
        };
        let weight = strength_col.and_then(|c| c.get(i)).unwrap_or(1.0);
        links.push(Link::new(src, dst, weight));
    }

    if skipped > 0 {
        log::warn!("Skipped {} link rows with missing endpoints", skipped);
    }
    log::info!("Loaded {} links", links.len());

    Ok(links)
}

/// Load nodes from a table with `Id`, `Created` (epoch milliseconds) and
/// optional `Tags` (comma-separated), `Path`, `X`, `Y`
pub fn load_nodes(path: &str) -> Result<Vec<Node>> {
    let df = read_frame(path)?;

    let id_col = required(&df, "Id", path)?.str()?;
    let created = required(&df, "Created", path)?.cast(&DataType::Int64)?;
    let created_col = created.i64()?;
    let tags_col = match df.column("Tags") {
        Ok(col) => Some(col.str()?),
        Err(_) => None,
    };
    let path_col = match df.column("Path") {
        Ok(col) => Some(col.str()?),
        Err(_) => None,
    };
    let coords = match (df.column("X"), df.column("Y")) {
        (Ok(x), Ok(y)) => Some((x.cast(&DataType::Float64)?, y.cast(&DataType::Float64)?)),
        _ => None,
    };
    let coord_cols = match &coords {
        Some((x, y)) => Some((x.f64()?, y.f64()?)),
        None => None,
    };

    let mut nodes = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let Some(id) = id_col.get(i) else { continue };
        let created = created_col
            .get(i)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_default();

        let mut node = Node::new(id, created);

        if let Some(tags) = tags_col.and_then(|c| c.get(i)) {
            node.tags = tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }
        node.path = path_col.and_then(|c| c.get(i)).map(String::from);
        if let Some((x, y)) = coord_cols {
            if let (Some(x), Some(y)) = (x.get(i), y.get(i)) {
                node.position = Some(Position::new(x, y));
            }
        }

        nodes.push(node);
    }

    log::info!("Loaded {} nodes", nodes.len());

    Ok(nodes)
}

/// Load a snapshot from a link table and an optional node table.
///
/// Without a node table, nodes are derived from link endpoints in first-seen
/// order, with no tags or paths and an epoch creation time.
pub fn load_snapshot(links_path: &str, nodes_path: Option<&str>) -> Result<GraphSnapshot> {
    let links = load_links(links_path)?;

    let nodes = match nodes_path {
        Some(path) => load_nodes(path)?,
        None => {
            let mut seen = HashSet::new();
            links
                .iter()
                .flat_map(|l| [l.source.id(), l.target.id()])
                .filter(|id| seen.insert(id.to_string()))
                .map(|id| Node::new(id, DateTime::<Utc>::default()))
                .collect()
        }
    };

    Ok(GraphSnapshot::new(nodes, links))
}
