//! Rule and decision evaluation
//!
//! Pure functions from definitions and aggregated values to outcomes. Warn
//! and fail bounds are independent: minima are strict (`value < bound`),
//! maxima are inclusive (`value >= bound`), and a rule may warn while still
//! passing.

use crate::aggregate::AggregatedMetrics;
use crate::error::QcError;
use prov_registry::{Decision, DecisionId, DecisionKind, DecisionOp, Rule, RuleId, TestId, TestVersionId};
use serde::Serialize;
use std::collections::HashMap;

/// Lifecycle of one (test version, target group) evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvalState {
    /// Not yet looked at (also the terminal state of skipped tests)
    Unevaluated,
    /// Rules are being evaluated
    Evaluating,
    /// Finished with no failing decision
    Pass,
    /// Finished with at least one failing decision
    Fail,
}

/// Outcome of one rule against the aggregated metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// The evaluated rule
    pub rule: RuleId,
    /// `namespace.name` of the metric read
    pub metric: String,
    /// The aggregated value the bounds were applied to
    pub value: f64,
    /// Whether a warn bound was breached
    pub is_warn: bool,
    /// Whether a fail bound was breached
    pub is_fail: bool,
}

impl RuleOutcome {
    /// A rule passes unless it fails; warning does not affect passing
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        !self.is_fail
    }
}

/// Evaluate one rule
///
/// # Errors
/// Fails when the metric the rule names is absent from the aggregation.
pub fn evaluate_rule(rule: &Rule, metrics: &AggregatedMetrics) -> Result<RuleOutcome, QcError> {
    let value = metrics.get(&rule.metric_namespace, &rule.metric_name).ok_or_else(|| {
        QcError::MissingMetric {
            namespace: rule.metric_namespace.clone(),
            name: rule.metric_name.clone(),
        }
    })?;

    let is_warn = rule.warn_min.is_some_and(|bound| value < bound)
        || rule.warn_max.is_some_and(|bound| value >= bound);
    let is_fail = rule.fail_min.is_some_and(|bound| value < bound)
        || rule.fail_max.is_some_and(|bound| value >= bound);

    Ok(RuleOutcome { rule: rule.id, metric: rule.metric_str(), value, is_warn, is_fail })
}

/// Outcome of one decision over rule outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    /// The evaluated decision
    pub decision: DecisionId,
    /// First rule combined
    pub rule_a: RuleId,
    /// Second rule combined, if any
    pub rule_b: Option<RuleId>,
    /// Whether any combined rule warned (OR under either operator)
    pub is_warn: bool,
    /// Whether the combination fails
    pub is_fail: bool,
}

impl DecisionOutcome {
    /// A decision passes unless it fails
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        !self.is_fail
    }
}

/// Evaluate one decision against already-evaluated rule outcomes
///
/// A decision without a second rule mirrors its rule exactly. With two
/// rules, the fail flag combines under the declared operator while the warn
/// flag always combines as OR.
///
/// # Errors
/// Fails when a referenced rule has no outcome in `by_rule`.
pub fn evaluate_decision(
    decision: &Decision,
    by_rule: &HashMap<RuleId, RuleOutcome>,
) -> Result<DecisionOutcome, QcError> {
    let resolve = |id: RuleId| {
        by_rule.get(&id).ok_or_else(|| {
            QcError::Lookup(format!("decision {} references unevaluated rule {id}", decision.id))
        })
    };

    match decision.kind {
        DecisionKind::Passthrough(a) => {
            let a = resolve(a)?;
            Ok(DecisionOutcome {
                decision: decision.id,
                rule_a: a.rule,
                rule_b: None,
                is_warn: a.is_warn,
                is_fail: a.is_fail,
            })
        }
        DecisionKind::Combine { a, b, op } => {
            let a = resolve(a)?;
            let b = resolve(b)?;
            let is_fail = match op {
                DecisionOp::And => a.is_fail && b.is_fail,
                DecisionOp::Or => a.is_fail || b.is_fail,
            };
            Ok(DecisionOutcome {
                decision: decision.id,
                rule_a: a.rule,
                rule_b: Some(b.rule),
                is_warn: a.is_warn || b.is_warn,
                is_fail,
            })
        }
    }
}

/// Outcome of one test within an equivalence-group evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    /// The evaluated test
    pub test: TestId,
    /// The version its rules came from (the highest-numbered one)
    pub version: TestVersionId,
    /// Terminal evaluation state
    pub state: EvalState,
    /// Whether a filter excluded the test
    pub is_skip: bool,
    /// Per-rule outcomes, empty when skipped
    pub rules: Vec<RuleOutcome>,
    /// Per-decision outcomes, empty when skipped
    pub decisions: Vec<DecisionOutcome>,
}

impl TestOutcome {
    /// A skipped test: rules never ran
    #[must_use]
    pub fn skipped(test: TestId, version: TestVersionId) -> Self {
        Self {
            test,
            version,
            state: EvalState::Unevaluated,
            is_skip: true,
            rules: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Whether the test finished passing
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.state == EvalState::Pass
    }

    /// Number of failing decisions among this test's own
    #[must_use]
    pub fn failing_decisions(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_fail).count()
    }
}
