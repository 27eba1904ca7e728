//! Persisted report rows
//!
//! Evaluation results land in four nested row kinds keyed so a re-run
//! updates existing rows in place instead of duplicating them:
//! equivalence report by (group, test group), test report by (group, test),
//! version report by (test report, version), and rule/decision records by
//! (version report, definition).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use prov_entity::GroupId;
use prov_registry::{DecisionId, EquivalenceGroupId, RuleId, TestId, TestVersionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! report_id {
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

report_id!(
    /// Identifier of an equivalence group report row
    EquivalenceReportId
);
report_id!(
    /// Identifier of a per-test report row
    TestReportId
);
report_id!(
    /// Identifier of a per-version report row
    ReportId
);
report_id!(
    /// Identifier of a per-rule record row
    RuleRecordId
);
report_id!(
    /// Identifier of a per-decision record row
    DecisionRecordId
);

/// Roll-up row for one (target group, equivalence group) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceGroupReport {
    /// Row identifier, stable across re-runs
    pub id: EquivalenceReportId,
    /// Target group evaluated
    pub group: GroupId,
    /// Equivalence group evaluated against
    pub test_group: EquivalenceGroupId,
    /// Overall roll-up result
    pub is_pass: bool,
    /// When the row was last written
    pub last_updated: DateTime<Utc>,
}

/// Row for one test within an equivalence report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Row identifier, stable across re-runs
    pub id: TestReportId,
    /// Target group evaluated
    pub group: GroupId,
    /// Owning equivalence report
    pub equivalence_report: EquivalenceReportId,
    /// The test this row reports on
    pub test: TestId,
    /// Whether the test passed (false when skipped)
    pub is_pass: bool,
    /// Whether a filter excluded the test
    pub is_skip: bool,
}

/// Row for one test-version run within a test report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Row identifier, stable across re-runs
    pub id: ReportId,
    /// Owning test report
    pub report_group: TestReportId,
    /// The version whose rules ran
    pub test_version: TestVersionId,
    /// When the run happened
    pub timestamp: DateTime<Utc>,
    /// Whether the run passed
    pub is_pass: bool,
    /// Whether the run was skipped
    pub is_skip: bool,
}

/// Row for one evaluated rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Row identifier, stable across re-runs
    pub id: RuleRecordId,
    /// Owning version report
    pub report: ReportId,
    /// The evaluated rule
    pub rule: RuleId,
    /// `namespace.name` of the metric read
    pub test_metric: String,
    /// Whether the rule passed
    pub is_pass: bool,
    /// Whether the rule warned
    pub is_warn: bool,
    /// Whether the rule failed
    pub is_fail: bool,
}

/// Row for one evaluated decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Row identifier, stable across re-runs
    pub id: DecisionRecordId,
    /// Owning version report
    pub report: ReportId,
    /// The evaluated decision
    pub decision: DecisionId,
    /// Record of the first combined rule
    pub rule_record_a: RuleRecordId,
    /// Record of the second combined rule, if any
    pub rule_record_b: Option<RuleRecordId>,
    /// Whether the decision passed
    pub is_pass: bool,
    /// Whether the decision warned
    pub is_warn: bool,
    /// Whether the decision failed
    pub is_fail: bool,
}

/// Idempotent store for report rows
///
/// Every upsert is get-or-create on the natural key followed by a field
/// update, so concurrent or repeated evaluations of the same group rewrite
/// the same rows (last writer wins) and never duplicate them.
#[derive(Debug, Default)]
pub struct ReportStore {
    equivalence: DashMap<(GroupId, EquivalenceGroupId), EquivalenceGroupReport>,
    tests: DashMap<(GroupId, TestId), TestReport>,
    versions: DashMap<(TestReportId, TestVersionId), Report>,
    rules: DashMap<(ReportId, RuleId), RuleRecord>,
    decisions: DashMap<(ReportId, DecisionId), DecisionRecord>,
}

impl ReportStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the roll-up row for (group, test group)
    pub fn upsert_equivalence(
        &self,
        group: GroupId,
        test_group: EquivalenceGroupId,
        is_pass: bool,
        now: DateTime<Utc>,
    ) -> EquivalenceReportId {
        let mut row = self.equivalence.entry((group, test_group)).or_insert_with(|| {
            EquivalenceGroupReport {
                id: EquivalenceReportId::new(),
                group,
                test_group,
                is_pass,
                last_updated: now,
            }
        });
        row.is_pass = is_pass;
        row.last_updated = now;
        row.id
    }

    /// Upsert the row for (group, test)
    pub fn upsert_test(
        &self,
        group: GroupId,
        equivalence_report: EquivalenceReportId,
        test: TestId,
        is_pass: bool,
        is_skip: bool,
    ) -> TestReportId {
        let mut row = self.tests.entry((group, test)).or_insert_with(|| TestReport {
            id: TestReportId::new(),
            group,
            equivalence_report,
            test,
            is_pass,
            is_skip,
        });
        row.equivalence_report = equivalence_report;
        row.is_pass = is_pass;
        row.is_skip = is_skip;
        row.id
    }

    /// Upsert the row for (test report, version)
    pub fn upsert_report(
        &self,
        report_group: TestReportId,
        test_version: TestVersionId,
        timestamp: DateTime<Utc>,
        is_pass: bool,
        is_skip: bool,
    ) -> ReportId {
        let mut row =
            self.versions.entry((report_group, test_version)).or_insert_with(|| Report {
                id: ReportId::new(),
                report_group,
                test_version,
                timestamp,
                is_pass,
                is_skip,
            });
        row.timestamp = timestamp;
        row.is_pass = is_pass;
        row.is_skip = is_skip;
        row.id
    }

    /// Upsert the record for (version report, rule)
    pub fn upsert_rule_record(
        &self,
        report: ReportId,
        rule: RuleId,
        test_metric: &str,
        is_pass: bool,
        is_warn: bool,
        is_fail: bool,
    ) -> RuleRecordId {
        let mut row = self.rules.entry((report, rule)).or_insert_with(|| RuleRecord {
            id: RuleRecordId::new(),
            report,
            rule,
            test_metric: test_metric.to_string(),
            is_pass,
            is_warn,
            is_fail,
        });
        row.test_metric = test_metric.to_string();
        row.is_pass = is_pass;
        row.is_warn = is_warn;
        row.is_fail = is_fail;
        row.id
    }

    /// Upsert the record for (version report, decision)
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_decision_record(
        &self,
        report: ReportId,
        decision: DecisionId,
        rule_record_a: RuleRecordId,
        rule_record_b: Option<RuleRecordId>,
        is_pass: bool,
        is_warn: bool,
        is_fail: bool,
    ) -> DecisionRecordId {
        let mut row = self.decisions.entry((report, decision)).or_insert_with(|| DecisionRecord {
            id: DecisionRecordId::new(),
            report,
            decision,
            rule_record_a,
            rule_record_b,
            is_pass,
            is_warn,
            is_fail,
        });
        row.rule_record_a = rule_record_a;
        row.rule_record_b = rule_record_b;
        row.is_pass = is_pass;
        row.is_warn = is_warn;
        row.is_fail = is_fail;
        row.id
    }

    // ---- reads ------------------------------------------------------------

    /// Roll-up row for (group, test group)
    #[must_use]
    pub fn equivalence_report(
        &self,
        group: GroupId,
        test_group: EquivalenceGroupId,
    ) -> Option<EquivalenceGroupReport> {
        self.equivalence.get(&(group, test_group)).map(|r| r.clone())
    }

    /// Row for (group, test)
    #[must_use]
    pub fn test_report(&self, group: GroupId, test: TestId) -> Option<TestReport> {
        self.tests.get(&(group, test)).map(|r| r.clone())
    }

    /// Row for (test report, version)
    #[must_use]
    pub fn version_report(
        &self,
        report_group: TestReportId,
        test_version: TestVersionId,
    ) -> Option<Report> {
        self.versions.get(&(report_group, test_version)).map(|r| r.clone())
    }

    /// Record for (version report, rule)
    #[must_use]
    pub fn rule_record(&self, report: ReportId, rule: RuleId) -> Option<RuleRecord> {
        self.rules.get(&(report, rule)).map(|r| r.clone())
    }

    /// Record for (version report, decision)
    #[must_use]
    pub fn decision_record(&self, report: ReportId, decision: DecisionId) -> Option<DecisionRecord> {
        self.decisions.get(&(report, decision)).map(|r| r.clone())
    }

    /// Total number of persisted rows across all tables
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.equivalence.len()
            + self.tests.len()
            + self.versions.len()
            + self.rules.len()
            + self.decisions.len()
    }

    /// Whether nothing has been persisted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
