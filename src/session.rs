//! Clustering session: settings, pipeline, and the cached result

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cluster::detection::detect_communities;
use crate::cluster::materialize::materialize;
use crate::cluster::postprocess::post_process;
use crate::cluster::{ClusteringResult, DebugReport};
use crate::config::ClusteringSettings;
use crate::error::ClusterResult;
use crate::graph::{GraphSnapshot, GraphView};

/// Graphs smaller than this are never clustered
pub const MIN_GRAPH_NODES: usize = 3;

/// Run the full pipeline once: detect, post-process, materialize.
///
/// Disabled settings or graphs under three nodes short-circuit to a result
/// with every node orphaned. Fails only on a malformed snapshot.
pub fn cluster_snapshot(
    snapshot: &GraphSnapshot,
    settings: &ClusteringSettings,
    now: DateTime<Utc>,
) -> ClusterResult<ClusteringResult> {
    let mut result = if !settings.enabled || snapshot.node_count() < MIN_GRAPH_NODES {
        log::debug!(
            "Skipping clustering (enabled: {}, nodes: {})",
            settings.enabled,
            snapshot.node_count()
        );
        ClusteringResult::empty(snapshot)
    } else {
        let view = GraphView::new(snapshot)?;
        let partition = detect_communities(&view, settings);
        let processed = post_process(&view, &partition, settings.min_cluster_size, settings.max_clusters);
        let clusters = materialize(&view, &processed.clusters, settings, now);

        ClusteringResult {
            clusters,
            modularity: processed.modularity,
            coverage: processed.coverage,
            orphan_nodes: processed
                .orphans
                .iter()
                .map(|&i| view.node_id(i).to_string())
                .collect(),
            debug: None,
        }
    };

    log::info!(
        "Clustered {} nodes into {} clusters (modularity {:.3}, coverage {:.3})",
        snapshot.node_count(),
        result.clusters.len(),
        result.modularity,
        result.coverage
    );

    if settings.debug_mode {
        let report = DebugReport::from_result(&result, settings.weights);
        if let Ok(json) = serde_json::to_string(&report) {
            log::debug!("Clustering debug report: {}", json);
        }
        result.debug = Some(report);
    }

    Ok(result)
}

/// Owns the active settings and the last result computed under them
#[derive(Debug, Default)]
pub struct ClusteringSession {
    settings: ClusteringSettings,
    cached: Option<Arc<ClusteringResult>>,
}

impl ClusteringSession {
    pub fn new(settings: ClusteringSettings) -> Self {
        Self { settings, cached: None }
    }

    pub fn settings(&self) -> &ClusteringSettings {
        &self.settings
    }

    /// Replace the settings; returns whether the cached result was dropped.
    ///
    /// Changes that only affect presentation keep the cache.
    pub fn update_settings(&mut self, settings: ClusteringSettings) -> bool {
        let stale = self.settings.invalidates(&settings);
        if stale {
            log::debug!("Settings change invalidates cached clustering");
            self.cached = None;
        }
        self.settings = settings;
        stale
    }

    /// Drop the cached result, e.g. after the graph itself changed
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Last result, if still valid for the current settings
    pub fn cached_result(&self) -> Option<Arc<ClusteringResult>> {
        self.cached.clone()
    }

    /// Recompute from scratch and cache the result
    pub fn cluster_graph(&mut self, snapshot: &GraphSnapshot) -> ClusterResult<Arc<ClusteringResult>> {
        self.cluster_graph_at(snapshot, Utc::now())
    }

    /// As `cluster_graph`, with an explicit reference time for temporal labels
    pub fn cluster_graph_at(
        &mut self,
        snapshot: &GraphSnapshot,
        now: DateTime<Utc>,
    ) -> ClusterResult<Arc<ClusteringResult>> {
        let result = Arc::new(cluster_snapshot(snapshot, &self.settings, now)?);
        self.cached = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Cached result if present, otherwise a fresh run
    pub fn current_or_cluster(&mut self, snapshot: &GraphSnapshot) -> ClusterResult<Arc<ClusteringResult>> {
        match &self.cached {
            Some(result) => Ok(Arc::clone(result)),
            None => self.cluster_graph(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;
    use crate::graph::{Link, Node};

    fn triangle() -> GraphSnapshot {
        let now = Utc::now();
        GraphSnapshot::new(
            vec![Node::new("a", now), Node::new("b", now), Node::new("c", now)],
            vec![Link::new("a", "b", 1.0), Link::new("b", "c", 1.0), Link::new("a", "c", 1.0)],
        )
    }

    #[test]
    fn test_cache_survives_identical_and_presentation_changes() {
        let mut session = ClusteringSession::new(ClusteringSettings::with_algorithm(Algorithm::Louvain));
        session.cluster_graph(&triangle()).unwrap();
        assert!(session.cached_result().is_some());

        assert!(!session.update_settings(session.settings().clone()));
        assert!(session.cached_result().is_some());

        let mut debug = session.settings().clone();
        debug.debug_mode = true;
        assert!(!session.update_settings(debug));
        assert!(session.cached_result().is_some());
    }

    #[test]
    fn test_qualifying_changes_drop_cache() {
        let mut session = ClusteringSession::default();
        session.cluster_graph(&triangle()).unwrap();

        let mut next = session.settings().clone();
        next.resolution = 1.5;
        assert!(session.update_settings(next));
        assert!(session.cached_result().is_none());

        session.cluster_graph(&triangle()).unwrap();
        let mut next = session.settings().clone();
        next.algorithm = Algorithm::Agglomerative;
        assert!(session.update_settings(next));
        assert!(session.cached_result().is_none());
    }

    #[test]
    fn test_current_or_cluster_reuses_cache() {
        let mut session = ClusteringSession::default();
        let first = session.current_or_cluster(&triangle()).unwrap();
        let second = session.current_or_cluster(&triangle()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        session.invalidate();
        let third = session.current_or_cluster(&triangle()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[test]
    fn test_debug_payload_is_gated() {
        let mut settings = ClusteringSettings::with_algorithm(Algorithm::Louvain);
        let plain = cluster_snapshot(&triangle(), &settings, Utc::now()).unwrap();
        assert!(plain.debug.is_none());

        settings.debug_mode = true;
        let debug = cluster_snapshot(&triangle(), &settings, Utc::now()).unwrap();
        let report = debug.debug.expect("debug report");
        assert_eq!(report.cluster_count, debug.clusters.len());
        assert_eq!(report.orphan_count, debug.orphan_nodes.len());
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        let now = Utc::now();
        let snapshot = GraphSnapshot::new(
            vec![Node::new("a", now), Node::new("a", now), Node::new("b", now)],
            Vec::new(),
        );
        assert!(cluster_snapshot(&snapshot, &ClusteringSettings::default(), now).is_err());
    }
}
