//! Command implementations for the asmdiff CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod compare;
pub mod completions;
pub mod signatures;

use std::path::Path;

use anyhow::Context;
use asmdiff_core::{JsonSnapshotProvider, MetadataProvider, MetadataSnapshot, TypeKey};

/// Load a snapshot file. With `strict`, duplicate identities are an error,
/// types being keyed the way the comparison will pair them.
pub(crate) fn load_snapshot(
    path: &Path,
    strict: bool,
    type_key: TypeKey,
) -> anyhow::Result<MetadataSnapshot> {
    let snapshot = JsonSnapshotProvider::new()
        .load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    if strict {
        snapshot
            .validate(type_key)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    }

    Ok(snapshot)
}
