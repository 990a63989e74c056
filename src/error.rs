//! Error types for snapshot ingestion and settings validation
//!
//! The clustering pipeline itself never fails: degenerate inputs degrade to
//! empty or partial results. Errors only surface where a caller hands the
//! engine malformed data.

use thiserror::Error;

/// Result type alias for ingestion and configuration operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors raised at the snapshot and settings boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Two nodes in one snapshot share an identifier.
    #[error("Duplicate node id in snapshot: {0}")]
    DuplicateNode(String),

    /// Link strength must be a positive finite number.
    #[error("Invalid strength {strength} on link {source_id} -> {target_id}")]
    InvalidStrength {
        source_id: String,
        target_id: String,
        strength: f64,
    },

    /// Settings failed validation.
    #[error("Invalid clustering settings: {0}")]
    InvalidSettings(String),

    /// A tabular input is missing a required column.
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: String },
}
