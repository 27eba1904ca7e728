//! Identifier newtypes and reference unions
//!
//! Every entity table has its own id newtype so that a `ProcessId` can never
//! be handed to a function expecting an `ArtifactId`. Cross-table references
//! go through the closed unions [`EntityRef`] and [`MetaTarget`] instead of
//! dynamic (type, id) pairs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a physical or digital artifact
    ArtifactId
);
entity_id!(
    /// Identifier of a group (container of artifacts or sub-groups)
    GroupId
);
entity_id!(
    /// Identifier of a recorded process event
    ProcessId
);
entity_id!(
    /// Identifier of a single input/output edge of a process
    ProcessRecordId
);
entity_id!(
    /// Identifier of a metric namespace attached to an artifact
    MetricId
);
entity_id!(
    /// Identifier of a single metadata record
    MetaRecordId
);
entity_id!(
    /// Identifier of an audit log event
    AuditEventId
);

/// Reference to a traversable entity
///
/// Process record ends (inputs, outputs, bridges) may point at either an
/// artifact or a group. The union is closed: the walker matches on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// An artifact end
    Artifact(ArtifactId),
    /// A group end
    Group(GroupId),
}

impl EntityRef {
    /// Artifact id if this reference points at an artifact
    #[inline]
    #[must_use]
    pub fn as_artifact(&self) -> Option<ArtifactId> {
        match self {
            Self::Artifact(id) => Some(*id),
            Self::Group(_) => None,
        }
    }

    /// Group id if this reference points at a group
    #[inline]
    #[must_use]
    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            Self::Group(id) => Some(*id),
            Self::Artifact(_) => None,
        }
    }
}

impl From<ArtifactId> for EntityRef {
    fn from(id: ArtifactId) -> Self {
        Self::Artifact(id)
    }
}

impl From<GroupId> for EntityRef {
    fn from(id: GroupId) -> Self {
        Self::Group(id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Artifact(id) => write!(f, "artifact:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}

/// Attachment target for metadata records
///
/// Metadata can hang off any entity kind; a single table keyed by this union
/// replaces one metadata table per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetaTarget {
    /// Metadata attached to an artifact
    Artifact(ArtifactId),
    /// Metadata attached to a group
    Group(GroupId),
    /// Metadata attached to a process
    Process(ProcessId),
    /// Metadata attached to a single process record
    ProcessRecord(ProcessRecordId),
}

impl From<EntityRef> for MetaTarget {
    fn from(value: EntityRef) -> Self {
        match value {
            EntityRef::Artifact(id) => Self::Artifact(id),
            EntityRef::Group(id) => Self::Group(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(ArtifactId::new(), ArtifactId::new());
    }

    #[test]
    fn entity_ref_accessors() {
        let a = ArtifactId::new();
        let g = GroupId::new();
        assert_eq!(EntityRef::from(a).as_artifact(), Some(a));
        assert_eq!(EntityRef::from(a).as_group(), None);
        assert_eq!(EntityRef::from(g).as_group(), Some(g));
    }

    #[test]
    fn entity_ref_display_names_kind() {
        let a = ArtifactId::new();
        assert!(EntityRef::from(a).to_string().starts_with("artifact:"));
    }
}
