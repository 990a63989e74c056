//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty};

use crate::cluster::ClusteringResult;
use crate::config::ClusteringSettings;
use crate::graph::GraphSnapshot;

/// Save a clustering result to the specified directory
pub fn save_results(
    result: &ClusteringResult,
    snapshot: &GraphSnapshot,
    settings: &ClusteringSettings,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving {} clusters to {}", result.clusters.len(), output_dir);

    fs::create_dir_all(output_dir)?;

    save_summary(result, snapshot, settings, output_dir)?;
    save_clusters(result, output_dir)?;
    save_orphans(result, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

/// Save summary information
fn save_summary(
    result: &ClusteringResult,
    snapshot: &GraphSnapshot,
    settings: &ClusteringSettings,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving summary information");

    let stats = result.statistics();
    let summary = json!({
        "graph_stats": {
            "node_count": snapshot.nodes.len(),
            "link_count": snapshot.links.len(),
        },
        "settings": settings,
        "quality": {
            "modularity": result.modularity,
            "coverage": result.coverage,
        },
        "cluster_stats": stats,
        "debug": result.debug,
    });

    write_json(&Path::new(output_dir).join("summary.json"), &summary)
}

/// Save individual cluster information
fn save_clusters(result: &ClusteringResult, output_dir: &str) -> Result<()> {
    log::info!("Saving individual cluster information");

    let clusters_dir = Path::new(output_dir).join("clusters");
    fs::create_dir_all(&clusters_dir)?;

    for cluster in &result.clusters {
        let path = clusters_dir.join(format!("{}.json", cluster.id));
        write_json(&path, &serde_json::to_value(cluster)?)?;
    }

    let all_clusters = json!({
        "clusters": result.clusters.iter().map(|c| {
            json!({
                "id": c.id,
                "size": c.size(),
                "type": c.cluster_type,
                "strength": c.strength,
                "label": c.label,
            })
        }).collect::<Vec<_>>()
    });

    write_json(&Path::new(output_dir).join("all_clusters.json"), &all_clusters)
}

fn save_orphans(result: &ClusteringResult, output_dir: &str) -> Result<()> {
    let orphans = json!({
        "count": result.orphan_nodes.len(),
        "nodes": result.orphan_nodes,
    });

    write_json(&Path::new(output_dir).join("orphans.json"), &orphans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;
    use crate::graph::{Link, Node};
    use crate::session::cluster_snapshot;
    use chrono::Utc;

    #[test]
    fn test_save_results_writes_expected_files() {
        let now = Utc::now();
        let snapshot = GraphSnapshot::new(
            (0..4).map(|i| Node::new(format!("n{}", i), now)).collect(),
            vec![Link::new("n0", "n1", 1.0), Link::new("n1", "n2", 1.0), Link::new("n0", "n2", 1.0)],
        );
        let settings = ClusteringSettings::with_algorithm(Algorithm::Louvain);
        let result = cluster_snapshot(&snapshot, &settings, now).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        save_results(&result, &snapshot, &settings, out).unwrap();

        assert!(dir.path().join("summary.json").exists());
        assert!(dir.path().join("all_clusters.json").exists());
        assert!(dir.path().join("clusters").join("cluster-0.json").exists());

        let orphans: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("orphans.json")).unwrap()).unwrap();
        assert_eq!(orphans["count"], 1);
        assert_eq!(orphans["nodes"][0], "n3");
    }
}
