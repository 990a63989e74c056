//! Export for external renderers and graph tools

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::cluster::ClusteringResult;
use crate::graph::GraphView;

/// Clusters exported as standalone GraphML files
const GRAPHML_CLUSTER_LIMIT: usize = 10;

/// Write GraphML, node assignment and cluster statistics files
pub fn export_for_renderers(result: &ClusteringResult, view: &GraphView<'_>, output_dir: &str) -> Result<()> {
    log::info!("Exporting {} clusters for renderers", result.clusters.len());

    let export_dir = Path::new(output_dir).join("export");
    fs::create_dir_all(&export_dir)?;

    export_graphml(result, view, &export_dir)?;
    export_node_assignments(result, view, &export_dir)?;
    export_cluster_stats(result, &export_dir)?;

    log::info!("Export written to {}", export_dir.display());

    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn csv_field(s: &str) -> String {
    if s.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// One GraphML file per large cluster, with internal links
fn export_graphml(result: &ClusteringResult, view: &GraphView<'_>, dir: &Path) -> Result<()> {
    for cluster in result.clusters.iter().take(GRAPHML_CLUSTER_LIMIT) {
        let mut file = File::create(dir.join(format!("{}.graphml", cluster.id)))?;

        writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
        writeln!(file, "  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>")?;
        writeln!(file, "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>")?;
        writeln!(file, "  <graph id=\"{}\" edgedefault=\"undirected\">", xml_escape(&cluster.id))?;

        let indices: Vec<usize> = cluster.members.iter().filter_map(|id| view.index_of(id)).collect();

        for &idx in &indices {
            writeln!(
                file,
                "    <node id=\"n{}\">\n      <data key=\"label\">{}</data>\n    </node>",
                idx,
                xml_escape(view.node_id(idx))
            )?;
        }

        let mut edge_id = 0;
        for &src in &indices {
            for (dst, weight) in view.adjacency.weighted_neighbors(src) {
                if src < dst && indices.contains(&dst) {
                    writeln!(
                        file,
                        "    <edge id=\"e{}\" source=\"n{}\" target=\"n{}\"><data key=\"weight\">{}</data></edge>",
                        edge_id, src, dst, weight
                    )?;
                    edge_id += 1;
                }
            }
        }

        writeln!(file, "  </graph>")?;
        writeln!(file, "</graphml>")?;
    }

    Ok(())
}

/// Every node with its cluster, or empty columns for orphans
fn export_node_assignments(result: &ClusteringResult, view: &GraphView<'_>, dir: &Path) -> Result<()> {
    let assignment = result.assignment();
    let types: std::collections::HashMap<&str, &str> = result
        .clusters
        .iter()
        .map(|c| (c.id.as_str(), c.cluster_type.as_str()))
        .collect();

    let mut file = File::create(dir.join("nodes.csv"))?;
    writeln!(file, "id,cluster_id,cluster_type")?;

    for idx in 0..view.node_count() {
        let id = view.node_id(idx);
        let cluster_id = assignment.get(id).map(String::as_str).unwrap_or("");
        let cluster_type = types.get(cluster_id).copied().unwrap_or("");
        writeln!(file, "{},{},{}", csv_field(id), cluster_id, cluster_type)?;
    }

    Ok(())
}

fn export_cluster_stats(result: &ClusteringResult, dir: &Path) -> Result<()> {
    let mut file = File::create(dir.join("cluster_stats.csv"))?;
    writeln!(file, "cluster_id,size,type,strength,centroid_x,centroid_y,radius,color,label")?;

    for cluster in &result.clusters {
        writeln!(
            file,
            "{},{},{},{:.6},{:.3},{:.3},{:.3},{},{}",
            cluster.id,
            cluster.size(),
            cluster.cluster_type,
            cluster.strength,
            cluster.centroid.x,
            cluster.centroid.y,
            cluster.radius,
            cluster.color,
            csv_field(&cluster.label)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, ClusteringSettings};
    use crate::graph::{GraphSnapshot, Link, Node};
    use crate::session::cluster_snapshot;
    use chrono::Utc;

    #[test]
    fn test_export_writes_csv_and_graphml() {
        let now = Utc::now();
        let snapshot = GraphSnapshot::new(
            (0..4).map(|i| Node::new(format!("n{}", i), now)).collect(),
            vec![Link::new("n0", "n1", 1.0), Link::new("n1", "n2", 1.0), Link::new("n0", "n2", 1.0)],
        );
        let settings = ClusteringSettings::with_algorithm(Algorithm::Louvain);
        let result = cluster_snapshot(&snapshot, &settings, now).unwrap();
        let view = GraphView::new(&snapshot).unwrap();

        let dir = tempfile::tempdir().unwrap();
        export_for_renderers(&result, &view, dir.path().to_str().unwrap()).unwrap();

        let nodes = fs::read_to_string(dir.path().join("export").join("nodes.csv")).unwrap();
        let lines: Vec<&str> = nodes.lines().collect();
        assert_eq!(lines[0], "id,cluster_id,cluster_type");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("n0,cluster-0,"));
        assert_eq!(lines[4], "n3,,");

        let graphml = fs::read_to_string(dir.path().join("export").join("cluster-0.graphml")).unwrap();
        assert_eq!(graphml.matches("<edge ").count(), 3);
    }

    #[test]
    fn test_csv_field_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
