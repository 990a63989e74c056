//! JSON graph snapshots

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::GraphSnapshot;

/// Read a snapshot of the form `{ "nodes": [...], "links": [...] }`
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<GraphSnapshot> {
    let path = path.as_ref();
    log::info!("Reading graph snapshot: {}", path.display());

    let file = File::open(path).with_context(|| format!("opening snapshot {}", path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing snapshot {}", path.display()))?;

    log::info!(
        "Loaded snapshot with {} nodes and {} links",
        snapshot.nodes.len(),
        snapshot.links.len()
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "nodes": [
                    {{ "id": "a", "created": "2024-01-01T00:00:00Z", "tags": ["x"], "path": "notes/a.md" }},
                    {{ "id": "b", "created": "2024-01-02T00:00:00Z", "position": {{ "x": 1.0, "y": 2.0 }} }}
                ],
                "links": [ {{ "source": "a", "target": {{ "id": "b" }}, "strength": 0.5 }} ]
            }}"#
        )
        .unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].tags, vec!["x".to_string()]);
        assert_eq!(snapshot.nodes[1].position, Some(crate::graph::Position::new(1.0, 2.0)));
        assert_eq!(snapshot.links[0].target.id(), "b");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_snapshot("/definitely/not/here.json").is_err());
    }
}
