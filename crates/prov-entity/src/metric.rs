//! Metric and metadata records
//!
//! A metric is a namespace of named quantitative values attached to one
//! artifact (a Ct value, sequence QC percentages, mapping coverage).
//! Metadata records are free-form (tag, name, value) strings attachable to
//! any entity via [`MetaTarget`].

use crate::ids::{ArtifactId, MetaRecordId, MetaTarget, MetricId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A quantitative measurement namespace attached to one artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Unique identifier
    pub id: MetricId,
    /// Owning artifact
    pub artifact: ArtifactId,
    /// Namespace, e.g. `sequence` or `mapping`
    pub namespace: String,
    /// Named values within the namespace
    pub values: BTreeMap<String, f64>,
}

impl Metric {
    /// Create an empty metric namespace for `artifact`
    #[must_use]
    pub fn new(artifact: ArtifactId, namespace: impl Into<String>) -> Self {
        Self {
            id: MetricId::new(),
            artifact,
            namespace: namespace.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add a named value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Look up a named value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// A single metadata entry attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Unique identifier
    pub id: MetaRecordId,
    /// Entity the record hangs off
    pub target: MetaTarget,
    /// Grouping tag, e.g. `collection`
    pub tag: String,
    /// Field name within the tag
    pub name: String,
    /// String value
    pub value: String,
}

impl MetaRecord {
    /// Create a metadata record
    #[must_use]
    pub fn new(
        target: MetaTarget,
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: MetaRecordId::new(),
            target,
            tag: tag.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}
