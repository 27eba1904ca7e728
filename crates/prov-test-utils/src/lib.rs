//! Testing utilities for the PVK workspace
//!
//! Shared fixtures: a five-stage sample pipeline in an entity store and the
//! reference registry used across engine tests.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use prov_entity::{
    Artifact, ArtifactId, ArtifactKind, EntityStore, Group, GroupId, GroupKind, Metric, Process,
    ProcessId, ProcessKind, ProcessRecord,
};
use prov_registry::{
    Decision, DecisionId, DecisionKind, EquivalenceGroupId, QualityTest, Rule, RuleId,
    TestEquivalenceGroup, TestId, TestRegistry, TestVersionId,
};

/// Fixed base instant so fixture timestamps are deterministic
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 15, 12, 0, 0).unwrap()
}

/// A process `hours` after [`base_time`]
pub fn process_at(kind: ProcessKind, hours: i64, actor: &str) -> Process {
    Process::new(kind, base_time() + chrono::Duration::hours(hours), actor)
}

/// Ids of the canonical five-stage pipeline fixture
pub struct PipelineFixture {
    pub rack: GroupId,
    pub pag: GroupId,
    pub biosample: ArtifactId,
    pub library: ArtifactId,
    pub readset: ArtifactId,
    pub consensus: ArtifactId,
    pub collection: ProcessId,
    pub pooling: ProcessId,
    pub sequencing: ProcessId,
    pub pipeline: ProcessId,
    pub publication: ProcessId,
}

/// Build collection → pooling → sequencing → pipeline → publication in `store`
///
/// The consensus file is tagged to the published artifact group, ready for
/// metric aggregation against it.
pub fn build_sample_pipeline(store: &EntityStore) -> PipelineFixture {
    let rack = store.insert_group(Group::new(GroupKind::Rack, "RACK-1")).unwrap();
    let pag = store
        .insert_group(Group::new(GroupKind::PublishedArtifactGroup, "PAG-2021-01"))
        .unwrap();

    let collection = store
        .insert_process(process_at(ProcessKind::Sampling, 0, "collector"))
        .unwrap();
    let pooling = store.insert_process(process_at(ProcessKind::Pooling, 1, "tech")).unwrap();
    let sequencing = store
        .insert_process(process_at(ProcessKind::Sequencing, 2, "sequencer"))
        .unwrap();
    let pipeline = store
        .insert_process(process_at(ProcessKind::PipelineRun, 3, "pipeline-bot"))
        .unwrap();
    let publication = store
        .insert_process(process_at(ProcessKind::Publication, 4, "publisher"))
        .unwrap();

    let biosample = store
        .insert_artifact(
            Artifact::new(ArtifactKind::Biosample, "S-001").in_group(rack).created_by(collection),
        )
        .unwrap();
    let library = store
        .insert_artifact(
            Artifact::new(ArtifactKind::Library, "LIB-001").in_group(rack).created_by(pooling),
        )
        .unwrap();
    let readset = store
        .insert_artifact(
            Artifact::new(ArtifactKind::SequencingRead, "RS-001").created_by(sequencing),
        )
        .unwrap();
    let consensus = store
        .insert_artifact(
            Artifact::new(ArtifactKind::DigitalFile, "consensus.fa")
                .in_group(pag)
                .created_by(pipeline)
                .tagged(pag),
        )
        .unwrap();

    store
        .insert_record(ProcessRecord::new(collection).with_output(biosample))
        .unwrap();
    store
        .insert_record(ProcessRecord::new(pooling).with_input(biosample).with_output(library))
        .unwrap();
    store
        .insert_record(ProcessRecord::new(sequencing).with_input(library).with_output(readset))
        .unwrap();
    store
        .insert_record(ProcessRecord::new(pipeline).with_input(readset).with_output(consensus))
        .unwrap();
    store
        .insert_record(ProcessRecord::new(publication).with_input(consensus).with_output(pag))
        .unwrap();

    PipelineFixture {
        rack,
        pag,
        biosample,
        library,
        readset,
        consensus,
        collection,
        pooling,
        sequencing,
        pipeline,
        publication,
    }
}

/// Attach the scenario metrics to an artifact
pub fn attach_scenario_metrics(
    store: &EntityStore,
    artifact: ArtifactId,
    pc_acgt: f64,
    pc_pos_cov_gte10: f64,
) {
    store
        .insert_metric(Metric::new(artifact, "sequence").with_value("pc_acgt", pc_acgt))
        .unwrap();
    store
        .insert_metric(
            Metric::new(artifact, "mapping").with_value("pc_pos_cov_gte10", pc_pos_cov_gte10),
        )
        .unwrap();
}

/// Ids of the reference registry fixture
pub struct ScenarioFixture {
    pub group: EquivalenceGroupId,
    pub test: TestId,
    pub version: TestVersionId,
    pub rule_acgt: RuleId,
    pub rule_cov: RuleId,
    pub decision: DecisionId,
}

/// Register the reference release gate
///
/// One test carrying rule R1 (`sequence.pc_acgt`, fail below 0.9), rule R2
/// (`mapping.pc_pos_cov_gte10`, warn below 0.95), and decision D1
/// passing through R1.
pub fn scenario_registry(registry: &TestRegistry) -> ScenarioFixture {
    let test = registry.register_test(QualityTest::new("sequence-quality"));
    let version = registry.publish_version(test).unwrap();
    let rule_acgt = registry
        .add_rule(Rule::new(version.id, "sequence", "pc_acgt").fail_below(0.9))
        .unwrap();
    let rule_cov = registry
        .add_rule(Rule::new(version.id, "mapping", "pc_pos_cov_gte10").warn_below(0.95))
        .unwrap();
    let decision = registry
        .add_decision(Decision {
            id: DecisionId::new(),
            version: version.id,
            kind: DecisionKind::Passthrough(rule_acgt),
        })
        .unwrap();

    let mut group = TestEquivalenceGroup::new("release-gate");
    group.tests.push(test);
    let group = registry.register_group(group).unwrap();

    ScenarioFixture { group, test, version: version.id, rule_acgt, rule_cov, decision }
}
