//! Group records
//!
//! A group is a container of artifacts or sub-groups: a directory of files,
//! a published artifact group (a named release bundle), a rack of tubes.
//! Parent pointers form a strict hierarchy; tag links are flat labels and
//! carry no hierarchy.

use crate::ids::GroupId;
use crate::kind::KindDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Concrete group kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Directory of digital artifacts
    Directory,
    /// Named, versioned release bundle of artifacts
    PublishedArtifactGroup,
    /// Physical rack of tubes
    Rack,
}

impl GroupKind {
    /// Descriptor for this kind
    #[must_use]
    pub fn descriptor(&self) -> KindDescriptor {
        match self {
            Self::Directory => KindDescriptor::new("directory", "Directory"),
            Self::PublishedArtifactGroup => {
                KindDescriptor::new("published_artifact_group", "Published Artifact Group")
            }
            Self::Rack => KindDescriptor::new("rack", "Tube Rack"),
        }
    }

    /// Stable lowercase code for serialization and display
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.descriptor().code
    }
}

/// A container of artifacts or sub-groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,
    /// Kind discriminator
    pub kind: GroupKind,
    /// Display name
    pub name: String,
    /// Parent group in the strict hierarchy
    pub parent: Option<GroupId>,
    /// Tag groups labeling this group
    pub tags: BTreeSet<GroupId>,
}

impl Group {
    /// Create a new group with a fresh id
    #[must_use]
    pub fn new(kind: GroupKind, name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            kind,
            name: name.into(),
            parent: None,
            tags: BTreeSet::new(),
        }
    }

    /// Attach the group under a parent
    #[inline]
    #[must_use]
    pub fn child_of(mut self, parent: GroupId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Label the group with a tag group
    #[inline]
    #[must_use]
    pub fn tagged(mut self, tag: GroupId) -> Self {
        self.tags.insert(tag);
        self
    }
}
