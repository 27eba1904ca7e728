//! Engine error types
//!
//! Every failure mode of an evaluation is a structured result returned to
//! the caller; nothing is persisted on any error path and no error crosses
//! the boundary as a panic.

use prov_entity::GroupId;
use prov_registry::RegistryError;

/// Errors aborting a QC evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QcError {
    /// A test, rule, decision, or group reference did not resolve
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Two tagged artifacts supplied contradictory values for the same key
    #[error("conflicting values for {key}: {left} vs {right}")]
    Conflict {
        /// The aggregation key (metric namespace or metadata tag.name)
        key: String,
        /// First value seen
        left: String,
        /// Contradicting value
        right: String,
    },

    /// A declared rule could not be evaluated because its metric is absent
    #[error("evaluation incomplete: metric {namespace}.{name} is missing")]
    MissingMetric {
        /// Metric namespace the rule reads
        namespace: String,
        /// Metric name within the namespace
        name: String,
    },

    /// A mandatory filter field is absent from the aggregated metadata
    #[error("mandatory metadata field {tag}.{name} is missing")]
    MissingMandatoryField {
        /// Metadata tag of the filter
        tag: String,
        /// Metadata field name of the filter
        name: String,
    },

    /// Every test in the equivalence group was skipped
    #[error("no tests were performed for group {0}")]
    Vacuous(GroupId),
}

impl From<RegistryError> for QcError {
    fn from(value: RegistryError) -> Self {
        Self::Lookup(value.to_string())
    }
}
