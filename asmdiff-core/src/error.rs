//! Error types for asmdiff-core.
//!
//! The differ itself never fails; these cover loading and validating
//! snapshots at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur while loading or validating a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot file could not be read.
    #[error("Failed to read snapshot {}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content is not valid JSON or does not match the schema.
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    /// Version string is not `major[.minor[.build[.revision]]]`.
    #[error("Invalid version string: '{value}'")]
    InvalidVersion {
        /// The rejected input.
        value: String,
    },

    /// Two entities at the same level share an identity key.
    #[error("Duplicate {scope} identity: '{key}'")]
    DuplicateIdentity {
        /// Which collection the duplicate was found in.
        scope: String,
        /// The repeated key.
        key: String,
    },
}
