//! Quality-control decision engine
//!
//! Evaluates versioned test/rule/decision definitions from the registry
//! against metrics and metadata aggregated over a target group's artifacts,
//! and persists idempotent report rows.
//!
//! # Evaluation semantics
//!
//! Strict all-or-nothing: lookup failures, aggregation conflicts, missing
//! mandatory metadata, and unevaluable rules all abort the run before any
//! row is written. A run where every test was filtered out is refused as
//! vacuous rather than reported as a pass.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use prov_engine::QcEngine;
//! use prov_entity::EntityStore;
//! use prov_registry::TestRegistry;
//!
//! let store = Arc::new(EntityStore::new());
//! let registry = Arc::new(TestRegistry::new());
//! let engine = QcEngine::new(store, registry);
//! assert!(engine.reports().is_empty());
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod report;

// Re-exports
pub use aggregate::{aggregate_metadata, aggregate_metrics, AggregatedMetadata, AggregatedMetrics};
pub use engine::{QcConfig, QcEngine, QcResult};
pub use error::QcError;
pub use outcome::{
    evaluate_decision, evaluate_rule, DecisionOutcome, EvalState, RuleOutcome, TestOutcome,
};
pub use report::{
    DecisionRecord, DecisionRecordId, EquivalenceGroupReport, EquivalenceReportId, Report,
    ReportId, ReportStore, RuleRecord, RuleRecordId, TestReport, TestReportId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for engine operations
    pub use crate::{
        QcConfig, QcEngine, QcError, QcResult, ReportStore, TestOutcome,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
