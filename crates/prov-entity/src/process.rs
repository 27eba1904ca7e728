//! Process and process record entities
//!
//! A process is a recorded event that produced or transformed artifacts or
//! groups. Its individual edges are process records: each record carries at
//! most one input end and one output end, and optionally a bridge entity
//! gating downward traversal across branches.

use crate::ids::{EntityRef, ProcessId, ProcessRecordId};
use crate::kind::KindDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Concrete process kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Sample collection event
    Sampling,
    /// Pooling of samples into a library
    Pooling,
    /// Sequencing run
    Sequencing,
    /// Bioinformatics pipeline run
    PipelineRun,
    /// Publication of an output bundle
    Publication,
    /// Quarantine flagging event
    Quarantine,
}

impl ProcessKind {
    /// Descriptor for this kind
    #[must_use]
    pub fn descriptor(&self) -> KindDescriptor {
        match self {
            Self::Sampling => KindDescriptor::new("sampling", "Sample Collection"),
            Self::Pooling => KindDescriptor::new("pooling", "Library Pooling"),
            Self::Sequencing => KindDescriptor::new("sequencing", "Sequencing Run"),
            Self::PipelineRun => KindDescriptor::new("pipeline_run", "Pipeline Run"),
            Self::Publication => KindDescriptor::new("publication", "Publication"),
            Self::Quarantine => KindDescriptor::new("quarantine", "Quarantine"),
        }
    }

    /// Stable lowercase code for serialization and display
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.descriptor().code
    }
}

/// A recorded event transforming or creating entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Unique identifier
    pub id: ProcessId,
    /// Kind discriminator
    pub kind: ProcessKind,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Who performed or recorded the event
    pub actor: String,
}

impl Process {
    /// Create a new process with a fresh id
    #[must_use]
    pub fn new(kind: ProcessKind, timestamp: DateTime<Utc>, actor: impl Into<String>) -> Self {
        Self {
            id: ProcessId::new(),
            kind,
            timestamp,
            actor: actor.into(),
        }
    }
}

/// One input/output edge of a process
///
/// Either end may be absent: a sampling event has no input, an archival
/// event may have no output. Traversal tolerates absent ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Unique identifier
    pub id: ProcessRecordId,
    /// The process this record belongs to (exactly one)
    pub process: ProcessId,
    /// Input end
    pub in_ref: Option<EntityRef>,
    /// Output end
    pub out_ref: Option<EntityRef>,
    /// Bridge entity gating downward traversal through this record
    pub bridge: Option<EntityRef>,
    /// Human-readable annotation (quarantine reason, operator note)
    pub note: Option<String>,
}

impl ProcessRecord {
    /// Create a record owned by `process` with both ends absent
    #[must_use]
    pub fn new(process: ProcessId) -> Self {
        Self {
            id: ProcessRecordId::new(),
            process,
            in_ref: None,
            out_ref: None,
            bridge: None,
            note: None,
        }
    }

    /// Set the input end
    #[inline]
    #[must_use]
    pub fn with_input(mut self, input: impl Into<EntityRef>) -> Self {
        self.in_ref = Some(input.into());
        self
    }

    /// Set the output end
    #[inline]
    #[must_use]
    pub fn with_output(mut self, output: impl Into<EntityRef>) -> Self {
        self.out_ref = Some(output.into());
        self
    }

    /// Gate this record behind a bridge entity
    #[inline]
    #[must_use]
    pub fn bridged_by(mut self, bridge: impl Into<EntityRef>) -> Self {
        self.bridge = Some(bridge.into());
        self
    }

    /// Attach a note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
