//! asmdiff core - structural diff engine for compiled-module metadata.
//!
//! This crate compares two snapshots of a compiled module's declared
//! surface (assembly references, types, fields, methods, properties and
//! their attributes) and reports every entity as created, removed or
//! modified, with a canonical signature for each side of a change.
//!
//! # Features
//!
//! - **Identity-keyed reconciliation**: entities pair by stable key at every level
//! - **Canonical signatures**: deterministic, human-readable declarations
//! - **Breaking change detection**: flags differences that can break consumers
//! - **Parallel comparison**: common type pairs are diffed on the Rayon pool
//! - **JSON snapshots**: load snapshots produced by external metadata readers
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use asmdiff_core::{semantic_diff, DiffOptions, JsonSnapshotProvider, MetadataProvider};
//!
//! let provider = JsonSnapshotProvider::new();
//! let old = provider.load(Path::new("old.json"))?;
//! let new = provider.load(Path::new("new.json"))?;
//!
//! let result = semantic_diff(&old, &new, &DiffOptions::default());
//! println!("{}", result.summary_text);
//! # Ok::<(), asmdiff_core::SnapshotError>(())
//! ```

pub mod differ;
pub mod error;
pub mod options;
pub mod provider;
pub mod types;

pub use differ::{compare, semantic_diff, DiffResult, DiffSummary, Differ, Difference};
pub use error::{Result, SnapshotError};
pub use options::{DiffOptions, TypeKey};
pub use provider::{JsonSnapshotProvider, MetadataProvider};
pub use types::MetadataSnapshot;

/// Get the version of asmdiff-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
