//! Artifact records
//!
//! An artifact is any trackable physical or digital item moving through the
//! pipeline: a biosample swab, a tube, a prepared library, a sequencing read
//! set, a file on disk. Concrete kinds share one record shape with a
//! [`ArtifactKind`] discriminator; per-kind behavior lives in the descriptor
//! table and is dispatched by exhaustive matching, not subclassing.

use crate::ids::{ArtifactId, GroupId, ProcessId};
use crate::kind::KindDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Concrete artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Collected biological sample
    Biosample,
    /// Physical container holding a sample
    Tube,
    /// Prepared sequencing library
    Library,
    /// Output of a sequencing run
    SequencingRead,
    /// Digital file produced by a pipeline stage
    DigitalFile,
}

impl ArtifactKind {
    /// Descriptor for this kind
    #[must_use]
    pub fn descriptor(&self) -> KindDescriptor {
        match self {
            Self::Biosample => KindDescriptor::new("biosample", "Biosample"),
            Self::Tube => KindDescriptor::new("tube", "Sample Tube"),
            Self::Library => KindDescriptor::new("library", "Sequencing Library"),
            Self::SequencingRead => KindDescriptor::new("sequencing_read", "Read Set"),
            Self::DigitalFile => KindDescriptor::new("digital_file", "Digital File"),
        }
    }

    /// Stable lowercase code for serialization and display
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.descriptor().code
    }
}

/// A trackable physical or digital item
///
/// # Invariants
/// - `created`, when set, names the process that produced this artifact
/// - `root_artifact`, when set, names the origin of a derivative chain; the
///   root's quarantine flag governs the whole chain
/// - `tags` is non-hierarchical labeling, distinct from `primary_group`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique identifier
    pub id: ArtifactId,
    /// Kind discriminator
    pub kind: ArtifactKind,
    /// Display name (sample id, barcode, file name)
    pub name: String,
    /// Process that produced this artifact, if recorded
    pub created: Option<ProcessId>,
    /// Group this artifact primarily belongs to
    pub primary_group: Option<GroupId>,
    /// Tag groups labeling this artifact
    pub tags: BTreeSet<GroupId>,
    /// Whether this artifact is quarantined
    pub quarantined: bool,
    /// Origin artifact of a derivative chain
    pub root_artifact: Option<ArtifactId>,
}

impl Artifact {
    /// Create a new artifact with a fresh id
    #[must_use]
    pub fn new(kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            kind,
            name: name.into(),
            created: None,
            primary_group: None,
            tags: BTreeSet::new(),
            quarantined: false,
            root_artifact: None,
        }
    }

    /// Record the producing process
    #[inline]
    #[must_use]
    pub fn created_by(mut self, process: ProcessId) -> Self {
        self.created = Some(process);
        self
    }

    /// Place the artifact in a primary group
    #[inline]
    #[must_use]
    pub fn in_group(mut self, group: GroupId) -> Self {
        self.primary_group = Some(group);
        self
    }

    /// Label the artifact with a tag group
    #[inline]
    #[must_use]
    pub fn tagged(mut self, group: GroupId) -> Self {
        self.tags.insert(group);
        self
    }

    /// Mark this artifact as derived from `root`
    #[inline]
    #[must_use]
    pub fn derived_from(mut self, root: ArtifactId) -> Self {
        self.root_artifact = Some(root);
        self
    }
}
