//! QC evaluation engine
//!
//! One [`QcEngine::evaluate_qc`] call is one logical unit of work: it
//! aggregates the target group's metrics and metadata, evaluates every test
//! of the equivalence group against the highest-numbered version, and only
//! after the whole evaluation succeeds persists the report rows. Any error
//! aborts before persistence; there is no partial commit.

use crate::aggregate::{aggregate_metadata, aggregate_metrics};
use crate::error::QcError;
use crate::outcome::{
    evaluate_decision, evaluate_rule, EvalState, RuleOutcome, TestOutcome,
};
use crate::report::{EquivalenceReportId, ReportStore};
use chrono::Utc;
use prov_entity::{EntityStore, GroupId};
use prov_graph::ProvenanceWalker;
use prov_registry::{EquivalenceGroupId, RuleId, TestRegistry};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct QcConfig {
    /// Name recorded as the evaluating actor in log events
    pub actor: String,
}

impl QcConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an evaluating actor name
    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self { actor: "qc-engine".to_string() }
    }
}

/// Result of one successful equivalence-group evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcResult {
    /// Target group evaluated
    pub group: GroupId,
    /// Equivalence group evaluated against
    pub equivalence_group: EquivalenceGroupId,
    /// Overall roll-up: no failing decision across non-skipped tests
    pub is_pass: bool,
    /// Per-test outcomes in evaluation order
    pub tests: Vec<TestOutcome>,
    /// The persisted roll-up row
    pub report: EquivalenceReportId,
}

/// The quality-control decision engine
#[derive(Debug)]
pub struct QcEngine {
    store: Arc<EntityStore>,
    registry: Arc<TestRegistry>,
    reports: ReportStore,
    config: QcConfig,
}

impl QcEngine {
    /// Create an engine over a store and registry
    #[inline]
    #[must_use]
    pub fn new(store: Arc<EntityStore>, registry: Arc<TestRegistry>) -> Self {
        Self { store, registry, reports: ReportStore::new(), config: QcConfig::default() }
    }

    /// Replace the configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: QcConfig) -> Self {
        self.config = config;
        self
    }

    /// The persisted report rows
    #[inline]
    #[must_use]
    pub fn reports(&self) -> &ReportStore {
        &self.reports
    }

    /// Evaluate an equivalence group against a target group by display name
    ///
    /// # Errors
    /// Fails when either name is unknown or ambiguous, and for every reason
    /// [`Self::evaluate_qc`] fails.
    pub fn evaluate_qc_by_name(
        &self,
        group_name: &str,
        equivalence_name: &str,
    ) -> Result<QcResult, QcError> {
        let mut groups = self.store.groups_named(group_name);
        let group = match groups.len() {
            0 => return Err(QcError::Lookup(format!("no such target group: {group_name}"))),
            1 => groups.remove(0),
            _ => return Err(QcError::Lookup(format!("ambiguous target group: {group_name}"))),
        };
        let equivalence = self.registry.group_by_name(equivalence_name)?;
        self.evaluate_qc(group.id, equivalence.id)
    }

    /// Evaluate an equivalence group against a target group
    ///
    /// The five phases run in order: aggregate, filter, rules, decisions,
    /// roll-up. All outcomes are computed in memory; rows are persisted
    /// only once every phase has succeeded, keyed so re-runs update rather
    /// than duplicate.
    ///
    /// # Errors
    /// - [`QcError::Lookup`]: unresolvable group/test/rule reference
    /// - [`QcError::Conflict`]: contradictory aggregated values
    /// - [`QcError::MissingMandatoryField`]: a `force_field` filter found
    ///   no metadata
    /// - [`QcError::MissingMetric`]: a declared rule had nothing to read
    /// - [`QcError::Vacuous`]: every test was skipped
    pub fn evaluate_qc(
        &self,
        target_group: GroupId,
        equivalence_group: EquivalenceGroupId,
    ) -> Result<QcResult, QcError> {
        if self.store.get_group(target_group).is_none() {
            return Err(QcError::Lookup(format!("unknown target group: {target_group}")));
        }
        let equivalence = self
            .registry
            .get_group(equivalence_group)
            .ok_or_else(|| QcError::Lookup(format!("unknown equivalence group: {equivalence_group}")))?;

        tracing::info!(
            actor = %self.config.actor,
            group = %target_group,
            equivalence = %equivalence.name,
            "starting qc evaluation"
        );

        // Phase 1: aggregate metrics and metadata over the group's artifacts
        let walker = ProvenanceWalker::new(&self.store);
        let artifacts = walker.collect_group_artifacts(target_group);
        let metrics = aggregate_metrics(&self.store, &artifacts)?;
        let metadata = aggregate_metadata(&self.store, &artifacts)?;

        let mut outcomes: Vec<TestOutcome> = Vec::new();
        for test_id in &equivalence.tests {
            let test = self
                .registry
                .get_test(*test_id)
                .ok_or_else(|| QcError::Lookup(format!("unknown test: {test_id}")))?;
            let version = self.registry.latest_version(test.id)?;

            // Phase 2: filters decide whether the test applies at all
            let mut skip = false;
            for filter in &test.filters {
                match metadata.get(&filter.metadata_tag, &filter.metadata_name) {
                    None if filter.force_field => {
                        return Err(QcError::MissingMandatoryField {
                            tag: filter.metadata_tag.clone(),
                            name: filter.metadata_name.clone(),
                        });
                    }
                    None => {
                        tracing::debug!(
                            test = %test.name,
                            tag = %filter.metadata_tag,
                            name = %filter.metadata_name,
                            "filter field absent, filter not applied"
                        );
                    }
                    Some(value) if !filter.accepts(value) => {
                        tracing::debug!(test = %test.name, "filter excluded test");
                        skip = true;
                        break;
                    }
                    Some(_) => {}
                }
            }
            if skip {
                outcomes.push(TestOutcome::skipped(test.id, version.id));
                continue;
            }

            // Phase 3: every declared rule must evaluate or the run aborts
            let mut rules: Vec<RuleOutcome> = Vec::new();
            for rule in self.registry.rules_for(version.id) {
                rules.push(evaluate_rule(&rule, &metrics)?);
            }
            let by_rule: HashMap<RuleId, RuleOutcome> =
                rules.iter().map(|r| (r.rule, r.clone())).collect();

            // Phase 4: decisions combine rule outcomes
            let mut decisions = Vec::new();
            for decision in self.registry.decisions_for(version.id) {
                decisions.push(evaluate_decision(&decision, &by_rule)?);
            }

            let failing = decisions.iter().filter(|d| d.is_fail).count();
            let state = if failing == 0 { EvalState::Pass } else { EvalState::Fail };
            outcomes.push(TestOutcome {
                test: test.id,
                version: version.id,
                state,
                is_skip: false,
                rules,
                decisions,
            });
        }

        // Phase 5: roll-up. A run where nothing was tested must not report.
        if outcomes.iter().all(|t| t.is_skip) {
            tracing::warn!(group = %target_group, "every test was skipped, refusing vacuous pass");
            return Err(QcError::Vacuous(target_group));
        }
        let failing_total: usize =
            outcomes.iter().filter(|t| !t.is_skip).map(TestOutcome::failing_decisions).sum();
        let is_pass = failing_total == 0;

        let report = self.persist(target_group, equivalence_group, is_pass, &outcomes)?;
        tracing::info!(group = %target_group, is_pass, "qc evaluation complete");

        Ok(QcResult {
            group: target_group,
            equivalence_group,
            is_pass,
            tests: outcomes,
            report,
        })
    }

    fn persist(
        &self,
        target_group: GroupId,
        equivalence_group: EquivalenceGroupId,
        is_pass: bool,
        outcomes: &[TestOutcome],
    ) -> Result<EquivalenceReportId, QcError> {
        let now = Utc::now();
        let equivalence_report =
            self.reports.upsert_equivalence(target_group, equivalence_group, is_pass, now);

        for outcome in outcomes {
            let test_report = self.reports.upsert_test(
                target_group,
                equivalence_report,
                outcome.test,
                outcome.is_pass(),
                outcome.is_skip,
            );
            let report = self.reports.upsert_report(
                test_report,
                outcome.version,
                now,
                outcome.is_pass(),
                outcome.is_skip,
            );

            let mut record_ids = HashMap::new();
            for rule in &outcome.rules {
                let id = self.reports.upsert_rule_record(
                    report,
                    rule.rule,
                    &rule.metric,
                    rule.is_pass(),
                    rule.is_warn,
                    rule.is_fail,
                );
                record_ids.insert(rule.rule, id);
            }
            for decision in &outcome.decisions {
                let record_a = *record_ids.get(&decision.rule_a).ok_or_else(|| {
                    QcError::Lookup(format!("no rule record for rule {}", decision.rule_a))
                })?;
                let record_b = match decision.rule_b {
                    Some(rule_b) => Some(*record_ids.get(&rule_b).ok_or_else(|| {
                        QcError::Lookup(format!("no rule record for rule {rule_b}"))
                    })?),
                    None => None,
                };
                self.reports.upsert_decision_record(
                    report,
                    decision.decision,
                    record_a,
                    record_b,
                    decision.is_pass(),
                    decision.is_warn,
                    decision.is_fail,
                );
            }
        }
        Ok(equivalence_report)
    }
}
