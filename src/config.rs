//! Configuration management for the clustering engine

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

/// Community detection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Iterative local moves over a singleton start (Louvain-style)
    Louvain,
    /// Greedy pairwise merging by modularity gain
    Agglomerative,
    /// Louvain followed by multi-factor refinement
    Hybrid,
}

impl Algorithm {
    /// All strategies, in the order the CLI compares them
    pub const ALL: [Algorithm; 3] = [Algorithm::Louvain, Algorithm::Agglomerative, Algorithm::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Louvain => "louvain",
            Algorithm::Agglomerative => "agglomerative",
            Algorithm::Hybrid => "hybrid",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "louvain" => Ok(Algorithm::Louvain),
            "agglomerative" | "modularity" => Ok(Algorithm::Agglomerative),
            "hybrid" => Ok(Algorithm::Hybrid),
            other => Err(ClusterError::InvalidSettings(format!("unknown algorithm '{}'", other))),
        }
    }
}

/// Relative importance of each cohesion signal
///
/// Weights need not sum to one; combined scores are normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohesionWeights {
    pub link_strength: f64,
    pub shared_tags: f64,
    pub folder_hierarchy: f64,
    pub temporal_proximity: f64,
}

impl Default for CohesionWeights {
    fn default() -> Self {
        Self {
            link_strength: 0.4,
            shared_tags: 0.3,
            folder_hierarchy: 0.2,
            temporal_proximity: 0.1,
        }
    }
}

impl CohesionWeights {
    /// Sum of all four weights
    pub fn total(&self) -> f64 {
        self.link_strength + self.shared_tags + self.folder_hierarchy + self.temporal_proximity
    }

    fn as_array(&self) -> [(&'static str, f64); 4] {
        [
            ("linkStrength", self.link_strength),
            ("sharedTags", self.shared_tags),
            ("folderHierarchy", self.folder_hierarchy),
            ("temporalProximity", self.temporal_proximity),
        ]
    }
}

/// Per-factor multipliers applied when classifying a cluster's type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBoosts {
    pub tag: f64,
    pub link: f64,
    pub folder: f64,
    pub temporal: f64,
}

impl Default for TypeBoosts {
    fn default() -> Self {
        Self {
            tag: 1.2,
            link: 1.5,
            folder: 1.0,
            temporal: 1.0,
        }
    }
}

/// Empirical cutoffs used by refinement and type classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    /// Minimum boosted factor score for a signal-based type
    pub type_cutoff: f64,

    /// Hybrid refinement splits clusters whose cohesion falls below this
    pub split_cohesion: f64,

    /// Multipliers favouring the more legible signals
    pub boosts: TypeBoosts,

    /// Upper bound on local-move passes
    pub max_passes: usize,

    /// Fallback classification: clusters at least this large are communities
    pub community_size_hint: usize,

    /// Fallback classification: link cohesion above this marks a link-dense cluster
    pub link_dense_cutoff: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            type_cutoff: 0.15,
            split_cohesion: 0.3,
            boosts: TypeBoosts::default(),
            max_passes: 10,
            community_size_hint: 10,
            link_dense_cutoff: 0.1,
        }
    }
}

/// Settings handed to a clustering session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusteringSettings {
    /// Master switch; disabled sessions return an empty result
    pub enabled: bool,

    /// Detection strategy
    pub algorithm: Algorithm,

    /// Cohesion signal weights
    pub weights: CohesionWeights,

    /// Clusters smaller than this are dissolved into orphans
    pub min_cluster_size: usize,

    /// At most this many clusters survive post-processing
    pub max_clusters: usize,

    /// Null-model scale for modularity gains
    pub resolution: f64,

    /// Attach a diagnostic payload to results
    pub debug_mode: bool,

    /// Tuning constants
    pub thresholds: Thresholds,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: Algorithm::Hybrid,
            weights: CohesionWeights::default(),
            min_cluster_size: 3,
            max_clusters: 12,
            resolution: 1.0,
            debug_mode: false,
            thresholds: Thresholds::default(),
        }
    }
}

impl ClusteringSettings {
    /// Create settings for a given strategy with default tuning
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Whether switching from `self` to `other` makes a cached partition stale.
    ///
    /// Only `debug_mode` is presentation-only; every other field changes
    /// what the detectors or post-processor produce.
    pub fn invalidates(&self, other: &ClusteringSettings) -> bool {
        self.enabled != other.enabled
            || self.algorithm != other.algorithm
            || self.min_cluster_size != other.min_cluster_size
            || self.max_clusters != other.max_clusters
            || self.resolution != other.resolution
            || self.weights != other.weights
            || self.thresholds != other.thresholds
    }

    /// Check that the settings describe a runnable configuration
    pub fn validate(&self) -> ClusterResult<()> {
        if self.min_cluster_size == 0 {
            return Err(ClusterError::InvalidSettings("minClusterSize must be at least 1".into()));
        }
        if self.max_clusters == 0 {
            return Err(ClusterError::InvalidSettings("maxClusters must be at least 1".into()));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ClusterError::InvalidSettings(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        for (name, value) in self.weights.as_array() {
            if !value.is_finite() || value < 0.0 {
                return Err(ClusterError::InvalidSettings(format!(
                    "weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Load and validate settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ClusteringSettings> {
    let path = path.as_ref();
    log::info!("Reading clustering settings: {}", path.display());

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let settings: ClusteringSettings = serde_json::from_str(&raw)
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ClusteringSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.algorithm, Algorithm::Hybrid);
        assert!((settings.weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "algorithm": "louvain",
            "minClusterSize": 2,
            "weights": { "linkStrength": 1.0, "sharedTags": 0.0, "folderHierarchy": 0.0, "temporalProximity": 0.0 }
        }"#;
        let settings: ClusteringSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.algorithm, Algorithm::Louvain);
        assert_eq!(settings.min_cluster_size, 2);
        assert_eq!(settings.max_clusters, 12);
        assert!(settings.enabled);
        assert_eq!(settings.thresholds, Thresholds::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = ClusteringSettings::default();
        settings.min_cluster_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = ClusteringSettings::default();
        settings.resolution = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = ClusteringSettings::default();
        settings.weights.shared_tags = -0.5;
        assert!(matches!(settings.validate(), Err(ClusterError::InvalidSettings(_))));
    }

    #[test]
    fn test_debug_mode_does_not_invalidate() {
        let current = ClusteringSettings::default();
        let mut next = current.clone();
        next.debug_mode = true;
        assert!(!current.invalidates(&next));

        next.weights.temporal_proximity = 0.5;
        assert!(current.invalidates(&next));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("Louvain".parse::<Algorithm>().unwrap(), Algorithm::Louvain);
        assert_eq!("agglomerative".parse::<Algorithm>().unwrap(), Algorithm::Agglomerative);
        assert!("spectral".parse::<Algorithm>().is_err());
    }
}
