//! Graph snapshot handed to the engine by the extraction layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 2-D coordinate assigned by an external layout pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A document in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier
    pub id: String,

    /// Tags attached to the document (may be empty)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Hierarchical path, `/`-separated
    #[serde(default)]
    pub path: Option<String>,

    /// Creation time
    pub created: DateTime<Utc>,

    /// Coordinate from the layout pass, absent until it has run
    #[serde(default)]
    pub position: Option<Position>,
}

impl Node {
    pub fn new(id: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
            path: None,
            created,
            position: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Non-empty path segments
    pub fn path_segments(&self) -> Vec<&str> {
        self.path
            .as_deref()
            .map(|p| p.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// One end of a link: either a bare id or an embedded node object.
///
/// Upstream producers emit both shapes; the builder resolves either to an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEndpoint {
    Id(String),
    Node { id: String },
}

impl LinkEndpoint {
    pub fn id(&self) -> &str {
        match self {
            LinkEndpoint::Id(id) => id,
            LinkEndpoint::Node { id } => id,
        }
    }
}

impl From<&str> for LinkEndpoint {
    fn from(id: &str) -> Self {
        LinkEndpoint::Id(id.to_string())
    }
}

impl From<String> for LinkEndpoint {
    fn from(id: String) -> Self {
        LinkEndpoint::Id(id)
    }
}

fn default_strength() -> f64 {
    1.0
}

/// Weighted connection between two documents, treated as undirected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: LinkEndpoint,
    pub target: LinkEndpoint,
    #[serde(default = "default_strength")]
    pub strength: f64,
}

impl Link {
    pub fn new(source: impl Into<LinkEndpoint>, target: impl Into<LinkEndpoint>, strength: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength,
        }
    }
}

/// Immutable per-run view of nodes and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
