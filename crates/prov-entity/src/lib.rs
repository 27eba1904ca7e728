//! Provenance entity model and store
//!
//! Persisted records for everything the pipeline tracks: artifacts, groups,
//! processes and their records, metrics, and metadata, held in a concurrent
//! in-process store with referential integrity on insert.
//!
//! # Overview
//!
//! - **Entities**: [`Artifact`], [`Group`], [`Process`], [`ProcessRecord`],
//!   [`Metric`], [`MetaRecord`], each with a kind discriminator where the
//!   domain has concrete kinds
//! - **References**: the closed unions [`EntityRef`] and [`MetaTarget`]
//! - **Store**: [`EntityStore`] with the secondary indices traversal needs
//! - **Audit**: [`AuditLog`], a hash-chained record of exceptional mutations
//!
//! # Example
//!
//! ```rust
//! use prov_entity::{Artifact, ArtifactKind, EntityStore, Group, GroupKind};
//!
//! let store = EntityStore::new();
//! let rack = store.insert_group(Group::new(GroupKind::Rack, "RACK-1")).unwrap();
//! let tube = store
//!     .insert_artifact(Artifact::new(ArtifactKind::Tube, "T-001").in_group(rack))
//!     .unwrap();
//! assert_eq!(store.group_members(rack), vec![tube]);
//! ```

#![warn(missing_docs)]

pub mod artifact;
pub mod audit;
pub mod error;
pub mod group;
pub mod ids;
pub mod kind;
pub mod metric;
pub mod process;
pub mod store;

// Re-exports
pub use artifact::{Artifact, ArtifactKind};
pub use audit::{AuditAction, AuditError, AuditEvent, AuditLog};
pub use error::StoreError;
pub use group::{Group, GroupKind};
pub use ids::{
    ArtifactId, AuditEventId, EntityRef, GroupId, MetaRecordId, MetaTarget, MetricId, ProcessId,
    ProcessRecordId,
};
pub use kind::KindDescriptor;
pub use metric::{MetaRecord, Metric};
pub use process::{Process, ProcessKind, ProcessRecord};
pub use store::EntityStore;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for entity operations
    pub use crate::{
        Artifact, ArtifactId, ArtifactKind, EntityRef, EntityStore, Group, GroupId, GroupKind,
        MetaRecord, MetaTarget, Metric, Process, ProcessId, ProcessKind, ProcessRecord,
        ProcessRecordId, StoreError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
