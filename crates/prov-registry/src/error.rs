//! Registry error types

use crate::model::{DecisionId, EquivalenceGroupId, RuleId, TestId, TestVersionId};

/// Errors raised by registry registration and lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// Equivalence group id is not registered
    #[error("unknown equivalence group: {0}")]
    UnknownGroup(EquivalenceGroupId),

    /// Test id is not registered
    #[error("unknown test: {0}")]
    UnknownTest(TestId),

    /// Test version id is not registered
    #[error("unknown test version: {0}")]
    UnknownVersion(TestVersionId),

    /// Rule id is not registered
    #[error("unknown rule: {0}")]
    UnknownRule(RuleId),

    /// Decision id is not registered
    #[error("unknown decision: {0}")]
    UnknownDecision(DecisionId),

    /// No entity registered under this name
    #[error("no such name: {0}")]
    NoSuchName(String),

    /// More than one entity registered under this name
    #[error("ambiguous name: {0}")]
    AmbiguousName(String),

    /// Test has no published versions yet
    #[error("test has no published versions: {0}")]
    NoVersions(TestId),

    /// Decision references rules from a different version
    #[error("decision rules must belong to the decision's version")]
    CrossVersionDecision,
}
