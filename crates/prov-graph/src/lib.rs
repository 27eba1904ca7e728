//! Provenance graph traversal
//!
//! Cycle-safe, bidirectional walks over the entity store:
//!
//! - [`ProvenanceWalker::ancestry`]: ordered process history, earliest
//!   first
//! - [`ProvenanceWalker::descendants`]: nested downstream tree with bridge
//!   gating
//! - [`ProvenanceWalker::is_quarantined`] / [`ProvenanceWalker::quarantine`]:
//!   taint detection and flagging with an auditable reason
//!
//! All visited state is owned by a single call; traversals are read-only,
//! take no exclusive locks, and tolerate a concurrently mutating store.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use prov_entity::prelude::*;
//! use prov_graph::ProvenanceWalker;
//!
//! let store = EntityStore::new();
//! let rack = store.insert_group(Group::new(GroupKind::Rack, "R1")).unwrap();
//! let sample = store
//!     .insert_artifact(Artifact::new(ArtifactKind::Biosample, "S1").in_group(rack))
//!     .unwrap();
//! let library = store
//!     .insert_artifact(Artifact::new(ArtifactKind::Library, "L1").in_group(rack))
//!     .unwrap();
//! let pooling = store
//!     .insert_process(Process::new(ProcessKind::Pooling, Utc::now(), "tech"))
//!     .unwrap();
//! store
//!     .insert_record(ProcessRecord::new(pooling).with_input(sample).with_output(library))
//!     .unwrap();
//!
//! let walker = ProvenanceWalker::new(&store);
//! let history = walker.ancestry(EntityRef::Artifact(library));
//! assert_eq!(history.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod walker;

// Re-exports
pub use error::GraphError;
pub use walker::{LineageNode, ProvenanceWalker};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
