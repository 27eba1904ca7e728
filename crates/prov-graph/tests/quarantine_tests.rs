use pretty_assertions::assert_eq;
use prov_entity::{
    Artifact, ArtifactKind, AuditAction, EntityStore, Group, GroupKind, ProcessKind,
};
use prov_graph::{GraphError, ProvenanceWalker};
use prov_test_utils::{build_sample_pipeline, process_at};

#[test]
fn quarantine_writes_record_before_flag() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let cause = store
        .insert_process(process_at(ProcessKind::Quarantine, 10, "ops"))
        .unwrap();
    let record_id = walker.quarantine(cause, fx.biosample, "contaminated swab").unwrap();

    let record = store.get_record(record_id).unwrap();
    assert_eq!(record.process, cause);
    assert_eq!(record.note.as_deref(), Some("contaminated swab"));
    assert!(store.get_artifact(fx.biosample).unwrap().quarantined);

    let events = store.audit().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::Quarantine);
    assert!(store.audit().verify_integrity().is_ok());
}

#[test]
fn quarantine_requires_known_entities() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let err = walker
        .quarantine(prov_entity::ProcessId::new(), fx.biosample, "n/a")
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownProcess(_)));

    let cause = store
        .insert_process(process_at(ProcessKind::Quarantine, 10, "ops"))
        .unwrap();
    let err = walker.quarantine(cause, prov_entity::ArtifactId::new(), "n/a").unwrap_err();
    assert!(matches!(err, GraphError::UnknownArtifact(_)));
}

#[test]
fn clean_chain_reports_nothing() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);
    assert_eq!(walker.is_quarantined(fx.consensus), None);
    assert_eq!(walker.quarantine_reason(fx.consensus), None);
}

#[test]
fn taint_propagates_down_the_ancestry() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let cause = store
        .insert_process(process_at(ProcessKind::Quarantine, 10, "ops"))
        .unwrap();
    walker.quarantine(cause, fx.biosample, "failed extraction control").unwrap();

    // Derivatives inherit the taint and can resolve the recorded note.
    assert_eq!(walker.is_quarantined(fx.consensus), Some(fx.biosample));
    assert_eq!(
        walker.quarantine_reason(fx.consensus).as_deref(),
        Some("failed extraction control")
    );
}

#[test]
fn root_artifact_answers_for_the_chain() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let walker = ProvenanceWalker::new(&store);

    let root = store
        .insert_artifact(Artifact::new(ArtifactKind::Biosample, "root").in_group(home))
        .unwrap();
    let derived = store
        .insert_artifact(
            Artifact::new(ArtifactKind::Library, "derived").in_group(home).derived_from(root),
        )
        .unwrap();

    assert_eq!(walker.is_quarantined(derived), None);

    let cause = store
        .insert_process(process_at(ProcessKind::Quarantine, 0, "ops"))
        .unwrap();
    walker.quarantine(cause, root, "root withdrawn").unwrap();
    assert_eq!(walker.is_quarantined(derived), Some(root));
    assert_eq!(walker.quarantine_reason(derived).as_deref(), Some("root withdrawn"));
}

#[test]
fn clean_root_short_circuits_the_ancestry_scan() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    // Derivative of a clean root, downstream of a tainted ancestor: the
    // root answers for the chain, so the ancestry is not consulted.
    let rooted = store
        .insert_artifact(
            Artifact::new(ArtifactKind::DigitalFile, "rerun.fa")
                .in_group(fx.pag)
                .derived_from(fx.consensus),
        )
        .unwrap();
    store
        .insert_record(
            prov_entity::ProcessRecord::new(fx.pipeline).with_input(fx.readset).with_output(rooted),
        )
        .unwrap();

    let cause = store
        .insert_process(process_at(ProcessKind::Quarantine, 10, "ops"))
        .unwrap();
    walker.quarantine(cause, fx.biosample, "late recall").unwrap();

    assert_eq!(walker.is_quarantined(rooted), None);
    // Without the root link the same artifact would inherit the taint.
    assert_eq!(walker.is_quarantined(fx.readset), Some(fx.biosample));
}

#[test]
fn latest_note_wins_when_flagged_twice() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let first = store
        .insert_process(process_at(ProcessKind::Quarantine, 10, "ops"))
        .unwrap();
    let second = store
        .insert_process(process_at(ProcessKind::Quarantine, 11, "ops"))
        .unwrap();
    walker.quarantine(first, fx.library, "suspect pooling").unwrap();
    walker.quarantine(second, fx.library, "confirmed contamination").unwrap();

    assert_eq!(
        walker.quarantine_reason(fx.library).as_deref(),
        Some("confirmed contamination")
    );
    assert_eq!(store.audit().events().len(), 2);
}
