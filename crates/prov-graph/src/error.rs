//! Walker error types

use prov_entity::{ArtifactId, ProcessId, StoreError};

/// Errors raised by graph operations that mutate the store
///
/// Read-only traversals do not error: cycles are stopped structurally by
/// visited sets and unresolvable ends are simply absent from the result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Quarantine target is not stored
    #[error("unknown artifact: {0}")]
    UnknownArtifact(ArtifactId),

    /// Quarantine cause is not stored
    #[error("unknown process: {0}")]
    UnknownProcess(ProcessId),

    /// Underlying store rejected a write
    #[error(transparent)]
    Store(#[from] StoreError),
}
