use pretty_assertions::assert_eq;
use prov_engine::{QcConfig, QcEngine, QcError};
use prov_entity::{
    Artifact, ArtifactKind, EntityStore, Group, GroupKind, GroupId, MetaRecord, MetaTarget, Metric,
};
use prov_registry::{
    Decision, DecisionId, DecisionKind, EquivalenceGroupId, FilterOp, QualityTest, Rule,
    TestEquivalenceGroup, TestFilter, TestRegistry,
};
use prov_test_utils::{attach_scenario_metrics, build_sample_pipeline, scenario_registry};
use std::sync::Arc;

struct Setup {
    store: Arc<EntityStore>,
    registry: Arc<TestRegistry>,
    engine: QcEngine,
    pag: GroupId,
    fixture: prov_test_utils::PipelineFixture,
    scenario: prov_test_utils::ScenarioFixture,
}

fn setup() -> Setup {
    let store = Arc::new(EntityStore::new());
    let fixture = build_sample_pipeline(&store);
    let registry = Arc::new(TestRegistry::new());
    let scenario = scenario_registry(&registry);
    let engine = QcEngine::new(Arc::clone(&store), Arc::clone(&registry))
        .with_config(QcConfig::new().with_actor("test-runner"));
    let pag = fixture.pag;
    Setup { store, registry, engine, pag, fixture, scenario }
}

#[test]
fn reference_scenario_fails_the_release_gate() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.85, 0.80);

    let result = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    assert!(!result.is_pass);

    let test = &result.tests[0];
    assert!(!test.is_pass());
    assert!(!test.is_skip);

    let acgt = test.rules.iter().find(|r| r.rule == s.scenario.rule_acgt).unwrap();
    assert!(acgt.is_fail);
    let cov = test.rules.iter().find(|r| r.rule == s.scenario.rule_cov).unwrap();
    assert!(cov.is_warn);
    assert!(cov.is_pass());

    let decision = &test.decisions[0];
    assert_eq!(decision.decision, s.scenario.decision);
    assert!(decision.is_fail);

    let report = s.engine.reports().equivalence_report(s.pag, s.scenario.group).unwrap();
    assert!(!report.is_pass);
}

#[test]
fn healthy_metrics_pass_and_persist_full_rows() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let result = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    assert!(result.is_pass);

    let reports = s.engine.reports();
    let equivalence = reports.equivalence_report(s.pag, s.scenario.group).unwrap();
    assert!(equivalence.is_pass);
    let test_report = reports.test_report(s.pag, s.scenario.test).unwrap();
    assert!(test_report.is_pass);
    assert!(!test_report.is_skip);
    let version_report = reports.version_report(test_report.id, s.scenario.version).unwrap();
    assert!(version_report.is_pass);
    let rule_record = reports.rule_record(version_report.id, s.scenario.rule_acgt).unwrap();
    assert!(rule_record.is_pass);
    assert_eq!(rule_record.test_metric, "sequence.pc_acgt");
    let decision_record =
        reports.decision_record(version_report.id, s.scenario.decision).unwrap();
    assert!(decision_record.is_pass);
    assert_eq!(decision_record.rule_record_a, rule_record.id);
    assert_eq!(decision_record.rule_record_b, None);

    // 1 equivalence + 1 test + 1 version + 2 rules + 1 decision
    assert_eq!(reports.row_count(), 6);
}

#[test]
fn rerun_updates_rows_in_place() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let first = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    let rows_after_first = s.engine.reports().row_count();
    let first_test_row = s.engine.reports().test_report(s.pag, s.scenario.test).unwrap();

    let second = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    let second_test_row = s.engine.reports().test_report(s.pag, s.scenario.test).unwrap();

    assert_eq!(first.report, second.report);
    assert_eq!(first_test_row.id, second_test_row.id);
    assert_eq!(first_test_row.is_pass, second_test_row.is_pass);
    assert_eq!(s.engine.reports().row_count(), rows_after_first);
}

#[test]
fn unsatisfied_filter_skips_the_test() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);
    s.store
        .insert_meta(MetaRecord::new(
            MetaTarget::Artifact(s.fixture.consensus),
            "collection",
            "is_surveillance",
            "N",
        ))
        .unwrap();

    // Second test only applies to surveillance collections.
    let gated = s.registry.register_test(
        QualityTest::new("surveillance-only").with_filter(TestFilter::new(
            "collection",
            "is_surveillance",
            FilterOp::Eq,
            "Y",
        )),
    );
    let gated_version = s.registry.publish_version(gated).unwrap();
    let gated_rule = s
        .registry
        .add_rule(Rule::new(gated_version.id, "sequence", "pc_acgt").fail_below(0.99))
        .unwrap();
    s.registry
        .add_decision(Decision {
            id: DecisionId::new(),
            version: gated_version.id,
            kind: DecisionKind::Passthrough(gated_rule),
        })
        .unwrap();
    s.registry.add_test_to_group(s.scenario.group, gated).unwrap();

    let result = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    // The gated test would fail on these metrics; skipping it leaves the
    // roll-up governed by the evaluated test alone.
    assert!(result.is_pass);

    let skipped = result.tests.iter().find(|t| t.test == gated).unwrap();
    assert!(skipped.is_skip);
    assert!(skipped.rules.is_empty());

    let row = s.engine.reports().test_report(s.pag, gated).unwrap();
    assert!(row.is_skip);
    assert!(!row.is_pass);
    let version_row = s.engine.reports().version_report(row.id, gated_version.id).unwrap();
    assert!(version_row.is_skip);
}

#[test]
fn missing_filter_field_is_ignored_unless_mandatory() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let test = s.registry.get_test(s.scenario.test).unwrap();
    assert!(test.filters.is_empty());

    // Re-register the test with an optional filter on an absent field.
    let optional = s.registry.register_test(
        QualityTest::new("optional-filter").with_filter(TestFilter::new(
            "collection",
            "county",
            FilterOp::Eq,
            "KENT",
        )),
    );
    let version = s.registry.publish_version(optional).unwrap();
    let rule = s
        .registry
        .add_rule(Rule::new(version.id, "sequence", "pc_acgt").fail_below(0.9))
        .unwrap();
    s.registry
        .add_decision(Decision {
            id: DecisionId::new(),
            version: version.id,
            kind: DecisionKind::Passthrough(rule),
        })
        .unwrap();
    s.registry.add_test_to_group(s.scenario.group, optional).unwrap();

    let result = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    let outcome = result.tests.iter().find(|t| t.test == optional).unwrap();
    assert!(!outcome.is_skip);
    assert!(outcome.is_pass());
}

#[test]
fn vacuous_run_persists_nothing() {
    let store = Arc::new(EntityStore::new());
    let fixture = build_sample_pipeline(&store);
    store
        .insert_meta(MetaRecord::new(
            MetaTarget::Artifact(fixture.consensus),
            "collection",
            "is_surveillance",
            "N",
        ))
        .unwrap();

    let registry = Arc::new(TestRegistry::new());
    let gated = registry.register_test(
        QualityTest::new("surveillance-only").with_filter(TestFilter::new(
            "collection",
            "is_surveillance",
            FilterOp::Eq,
            "Y",
        )),
    );
    registry.publish_version(gated).unwrap();
    let mut group = TestEquivalenceGroup::new("gate");
    group.tests.push(gated);
    let group = registry.register_group(group).unwrap();

    let engine = QcEngine::new(Arc::clone(&store), registry);
    let err = engine.evaluate_qc(fixture.pag, group).unwrap_err();
    assert_eq!(err, QcError::Vacuous(fixture.pag));
    assert!(engine.reports().is_empty());
}

#[test]
fn missing_mandatory_field_aborts_everything() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let strict = s.registry.register_test(
        QualityTest::new("strict-gate").with_filter(
            TestFilter::new("collection", "sample_type", FilterOp::Eq, "SWAB").mandatory(),
        ),
    );
    s.registry.publish_version(strict).unwrap();
    s.registry.add_test_to_group(s.scenario.group, strict).unwrap();

    let err = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap_err();
    assert_eq!(
        err,
        QcError::MissingMandatoryField { tag: "collection".into(), name: "sample_type".into() }
    );
    assert!(s.engine.reports().is_empty());
}

#[test]
fn missing_metric_aborts_everything() {
    let s = setup();
    // No metrics attached at all: the first rule has nothing to read.
    let err = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap_err();
    assert!(matches!(err, QcError::MissingMetric { .. }));
    assert!(s.engine.reports().is_empty());
}

#[test]
fn conflicting_group_metrics_abort_everything() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let rival = s
        .store
        .insert_artifact(
            Artifact::new(ArtifactKind::DigitalFile, "rival.fa")
                .in_group(s.pag)
                .tagged(s.pag),
        )
        .unwrap();
    s.store
        .insert_metric(Metric::new(rival, "sequence").with_value("pc_acgt", 0.5))
        .unwrap();

    let err = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap_err();
    assert!(matches!(err, QcError::Conflict { ref key, .. } if key == "sequence"));
    assert!(s.engine.reports().is_empty());
}

#[test]
fn unknown_references_are_lookup_errors() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    assert!(matches!(
        s.engine.evaluate_qc(GroupId::new(), s.scenario.group),
        Err(QcError::Lookup(_))
    ));
    assert!(matches!(
        s.engine.evaluate_qc(s.pag, EquivalenceGroupId::new()),
        Err(QcError::Lookup(_))
    ));
    assert!(s.engine.reports().is_empty());
}

#[test]
fn evaluation_uses_the_highest_numbered_version() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    // Publish a second version with an impossible rule; the engine must
    // pick it up and fail where version one passed.
    let v2 = s.registry.publish_version(s.scenario.test).unwrap();
    let strict_rule = s
        .registry
        .add_rule(Rule::new(v2.id, "sequence", "pc_acgt").fail_below(0.999))
        .unwrap();
    s.registry
        .add_decision(Decision {
            id: DecisionId::new(),
            version: v2.id,
            kind: DecisionKind::Passthrough(strict_rule),
        })
        .unwrap();

    let result = s.engine.evaluate_qc(s.pag, s.scenario.group).unwrap();
    assert!(!result.is_pass);
    assert_eq!(result.tests[0].version, v2.id);
}

#[test]
fn names_resolve_and_ambiguity_aborts() {
    let s = setup();
    attach_scenario_metrics(&s.store, s.fixture.consensus, 0.97, 0.99);

    let result = s.engine.evaluate_qc_by_name("PAG-2021-01", "release-gate").unwrap();
    assert!(result.is_pass);

    s.store
        .insert_group(Group::new(GroupKind::PublishedArtifactGroup, "PAG-2021-01"))
        .unwrap();
    let err = s.engine.evaluate_qc_by_name("PAG-2021-01", "release-gate").unwrap_err();
    assert!(matches!(err, QcError::Lookup(ref msg) if msg.contains("ambiguous")));
}
