//! Quality test registry
//!
//! Versioned quality-control definitions evaluated by the decision engine:
//!
//! - [`TestEquivalenceGroup`]: interchangeable tests sharing one roll-up
//! - [`QualityTest`] / [`TestVersion`]: named tests with numbered versions
//! - [`Rule`]: a metric-threshold check with independent warn/fail bounds
//! - [`Decision`]: a boolean combinator over one or two rules
//! - [`TestFilter`]: a metadata-keyed skip condition
//!
//! The registry enforces referential integrity on registration and owns the
//! latest-version invariant: [`TestRegistry::publish_version`] swaps
//! `is_latest` atomically.
//!
//! # Example
//!
//! ```rust
//! use prov_registry::{QualityTest, Rule, TestRegistry};
//!
//! let registry = TestRegistry::new();
//! let test = registry.register_test(QualityTest::new("basic-qc"));
//! let version = registry.publish_version(test).unwrap();
//! registry
//!     .add_rule(Rule::new(version.id, "sequence", "pc_acgt").fail_below(0.9))
//!     .unwrap();
//! assert_eq!(registry.latest_version(test).unwrap().id, version.id);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod registry;

// Re-exports
pub use error::RegistryError;
pub use model::{
    Decision, DecisionId, DecisionKind, DecisionOp, EquivalenceGroupId, FilterOp, QualityTest,
    Rule, RuleId, TestEquivalenceGroup, TestFilter, TestId, TestVersion, TestVersionId,
};
pub use registry::TestRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
