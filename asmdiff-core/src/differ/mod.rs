//! Structural diff engine for comparing metadata snapshots.
//!
//! Pairs entities across two snapshots by stable identity and reports what
//! was created, removed or modified at each level, with a canonical
//! signature for each side of a change.
//!
//! # Features
//!
//! - **Identity-keyed matching**: entities are paired by key, never by position
//! - **Per-predicate records**: one modified record per flag that changed
//! - **Breaking change detection**: classifies records that can break consumers
//! - **Parallel processing**: diffs common type pairs concurrently via Rayon
//!
//! # Example
//!
//! ```
//! use asmdiff_core::differ::{compare, Subject};
//! use asmdiff_core::types::{MetadataSnapshot, TypeDecl, TypeVisibility};
//!
//! let old = MetadataSnapshot::new("Lib.dll", "v4.0.30319");
//! let mut new = old.clone();
//! new.types.push(TypeDecl {
//!     visibility: TypeVisibility::Public,
//!     ..TypeDecl::new("Bar")
//! });
//!
//! let changes = compare(&old, &new);
//! assert_eq!(changes[0].subject, Subject::Type);
//! assert_eq!(changes[0].new_value.as_deref(), Some("public class Bar"));
//! ```

pub mod changes;
pub mod comparator;
pub mod reconcile;
pub mod signature;

pub use changes::{
    ChangeCounts, DiffResult, DiffSummary, Difference, DifferenceKind, Entity, Facet, Subject,
};
pub use comparator::{compare, semantic_diff, Differ};
