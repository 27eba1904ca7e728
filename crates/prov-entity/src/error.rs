//! Store error types

use crate::ids::{ArtifactId, GroupId, MetaTarget, ProcessId, ProcessRecordId};

/// Errors raised by the entity store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Referential integrity: record names a process the store does not hold
    #[error("unknown process: {0}")]
    UnknownProcess(ProcessId),

    /// Referential integrity: link names an artifact the store does not hold
    #[error("unknown artifact: {0}")]
    UnknownArtifact(ArtifactId),

    /// Referential integrity: link names a group the store does not hold
    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),

    /// Referential integrity: metadata names a target the store does not hold
    #[error("unknown metadata target: {0:?}")]
    UnknownTarget(MetaTarget),

    /// An entity with this id is already stored
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Record id was not found
    #[error("unknown process record: {0}")]
    UnknownRecord(ProcessRecordId),
}
