//! Registry entity types
//!
//! Versioned quality-control definitions: an equivalence group holds
//! interchangeable tests sharing one pass/fail roll-up; each test has
//! numbered versions carrying threshold rules and boolean decisions over
//! them; filters decide whether a test applies to a target at all.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! registry_id {
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

registry_id!(
    /// Identifier of a test equivalence group
    EquivalenceGroupId
);
registry_id!(
    /// Identifier of a quality test
    TestId
);
registry_id!(
    /// Identifier of one published version of a test
    TestVersionId
);
registry_id!(
    /// Identifier of a threshold rule
    RuleId
);
registry_id!(
    /// Identifier of a boolean decision over rules
    DecisionId
);

/// A set of interchangeable test definitions sharing one roll-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEquivalenceGroup {
    /// Unique identifier
    pub id: EquivalenceGroupId,
    /// Display name, unique per registry by convention
    pub name: String,
    /// Member tests, in evaluation order
    pub tests: Vec<TestId>,
}

impl TestEquivalenceGroup {
    /// Create an empty equivalence group
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: EquivalenceGroupId::new(), name: name.into(), tests: Vec::new() }
    }
}

/// Comparison operator of a test filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Metadata value must equal the filter value
    Eq,
    /// Metadata value must differ from the filter value
    Neq,
}

/// Skip condition keyed on an aggregated metadata value
///
/// Comparison is case-normalized (both sides upper-cased). A filter whose
/// condition is not met marks its test skipped; a missing metadata field is
/// only fatal when `force_field` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFilter {
    /// Metadata tag to look up
    pub metadata_tag: String,
    /// Metadata field name within the tag
    pub metadata_name: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value compared against
    pub value: String,
    /// Whether a missing field aborts the whole evaluation
    pub force_field: bool,
}

impl TestFilter {
    /// Create a filter
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        name: impl Into<String>,
        op: FilterOp,
        value: impl Into<String>,
    ) -> Self {
        Self {
            metadata_tag: tag.into(),
            metadata_name: name.into(),
            op,
            value: value.into(),
            force_field: false,
        }
    }

    /// Mark the metadata field mandatory
    #[inline]
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.force_field = true;
        self
    }

    /// Whether `candidate` satisfies the filter condition
    ///
    /// Both sides are upper-cased before comparison.
    #[must_use]
    pub fn accepts(&self, candidate: &str) -> bool {
        let equal = candidate.to_uppercase() == self.value.to_uppercase();
        match self.op {
            FilterOp::Eq => equal,
            FilterOp::Neq => !equal,
        }
    }
}

/// A named quality test with skip filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    /// Unique identifier
    pub id: TestId,
    /// Display name, unique per registry by convention
    pub name: String,
    /// Skip conditions; a filter written once governs every version
    pub filters: Vec<TestFilter>,
}

impl QualityTest {
    /// Create a test without filters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: TestId::new(), name: name.into(), filters: Vec::new() }
    }

    /// Attach a filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: TestFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// One published version of a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVersion {
    /// Unique identifier
    pub id: TestVersionId,
    /// Owning test
    pub test: TestId,
    /// Monotonically increasing version number
    pub version_number: u32,
    /// Whether this is the latest version of its test
    ///
    /// Maintained transactionally by the registry: publishing a new version
    /// atomically clears the previous holder.
    pub is_latest: bool,
}

/// A single metric-threshold check
///
/// Any bound may be absent, meaning "no bound". Warn and fail bounds are
/// independent: a rule may warn and still pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier
    pub id: RuleId,
    /// Owning test version
    pub version: TestVersionId,
    /// Metric namespace the rule reads, e.g. `sequence`
    pub metric_namespace: String,
    /// Metric name within the namespace, e.g. `pc_acgt`
    pub metric_name: String,
    /// Warn when the metric is strictly below this
    pub warn_min: Option<f64>,
    /// Warn when the metric is at or above this
    pub warn_max: Option<f64>,
    /// Fail when the metric is strictly below this
    pub fail_min: Option<f64>,
    /// Fail when the metric is at or above this
    pub fail_max: Option<f64>,
}

impl Rule {
    /// Create an unbounded rule on `namespace.name`
    #[must_use]
    pub fn new(
        version: TestVersionId,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: RuleId::new(),
            version,
            metric_namespace: namespace.into(),
            metric_name: name.into(),
            warn_min: None,
            warn_max: None,
            fail_min: None,
            fail_max: None,
        }
    }

    /// Set the warn-below bound
    #[inline]
    #[must_use]
    pub fn warn_below(mut self, bound: f64) -> Self {
        self.warn_min = Some(bound);
        self
    }

    /// Set the warn-at-or-above bound
    #[inline]
    #[must_use]
    pub fn warn_at_or_above(mut self, bound: f64) -> Self {
        self.warn_max = Some(bound);
        self
    }

    /// Set the fail-below bound
    #[inline]
    #[must_use]
    pub fn fail_below(mut self, bound: f64) -> Self {
        self.fail_min = Some(bound);
        self
    }

    /// Set the fail-at-or-above bound
    #[inline]
    #[must_use]
    pub fn fail_at_or_above(mut self, bound: f64) -> Self {
        self.fail_max = Some(bound);
        self
    }

    /// `namespace.name` display form used in report rows
    #[must_use]
    pub fn metric_str(&self) -> String {
        format!("{}.{}", self.metric_namespace, self.metric_name)
    }
}

/// Boolean combinator of a two-rule decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOp {
    /// Fails only when both rules fail
    And,
    /// Fails when either rule fails
    Or,
}

/// How a decision combines rule outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// Mirror a single rule's outcome exactly
    Passthrough(RuleId),
    /// Combine two rule outcomes with an operator
    ///
    /// Warnings bubble up as OR regardless of the operator.
    Combine {
        /// First rule
        a: RuleId,
        /// Second rule
        b: RuleId,
        /// Fail combinator
        op: DecisionOp,
    },
}

impl DecisionKind {
    /// First rule referenced by the decision
    #[inline]
    #[must_use]
    pub fn rule_a(&self) -> RuleId {
        match self {
            Self::Passthrough(a) | Self::Combine { a, .. } => *a,
        }
    }

    /// Second rule referenced, if any
    #[inline]
    #[must_use]
    pub fn rule_b(&self) -> Option<RuleId> {
        match self {
            Self::Passthrough(_) => None,
            Self::Combine { b, .. } => Some(*b),
        }
    }
}

/// A boolean decision over one or two rules of a test version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Unique identifier
    pub id: DecisionId,
    /// Owning test version
    pub version: TestVersionId,
    /// Combination shape
    pub kind: DecisionKind,
}
