//! Metadata providers: where snapshots come from.
//!
//! Decoding compiled module bytes is left to external tooling. What such a
//! tool hands over is the serialized form of [`MetadataSnapshot`], which
//! [`JsonSnapshotProvider`] reads.

use std::fs;
use std::path::Path;

use crate::error::{Result, SnapshotError};
use crate::types::MetadataSnapshot;

/// Source of metadata snapshots.
pub trait MetadataProvider {
    fn load(&self, path: &Path) -> Result<MetadataSnapshot>;
}

/// Reads snapshots stored as JSON documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSnapshotProvider;

impl JsonSnapshotProvider {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataProvider for JsonSnapshotProvider {
    fn load(&self, path: &Path) -> Result<MetadataSnapshot> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = MetadataSnapshot::from_json_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            module = %snapshot.name,
            types = snapshot.types.len(),
            references = snapshot.references.len(),
            "loaded snapshot"
        );

        Ok(snapshot)
    }
}

impl MetadataSnapshot {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        Ok(json?)
    }
}
