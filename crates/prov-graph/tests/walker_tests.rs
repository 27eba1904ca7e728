use prov_entity::{
    Artifact, ArtifactId, ArtifactKind, EntityRef, EntityStore, Group, GroupKind, ProcessKind,
    ProcessRecord,
};
use prov_graph::{LineageNode, ProvenanceWalker};
use prov_test_utils::{build_sample_pipeline, process_at};
use proptest::prelude::*;

fn tube(store: &EntityStore, home: prov_entity::GroupId, name: &str) -> ArtifactId {
    store
        .insert_artifact(Artifact::new(ArtifactKind::Tube, name).in_group(home))
        .unwrap()
}

#[test]
fn ancestry_reads_earliest_first() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let history = walker.ancestry(EntityRef::Artifact(fx.consensus));
    let kinds: Vec<ProcessKind> = history.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ProcessKind::Sampling,
            ProcessKind::Pooling,
            ProcessKind::Sequencing,
            ProcessKind::PipelineRun,
        ]
    );
}

#[test]
fn ancestry_of_group_includes_publication() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let history = walker.ancestry(EntityRef::Group(fx.pag));
    assert_eq!(history.len(), 5);
    assert_eq!(history.first().unwrap().kind, ProcessKind::Sampling);
    assert_eq!(history.last().unwrap().kind, ProcessKind::Publication);
}

#[test]
fn ancestry_terminates_on_cycle() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let a = tube(&store, home, "A");
    let b = tube(&store, home, "B");
    let p1 = store.insert_process(process_at(ProcessKind::Pooling, 0, "t")).unwrap();
    let p2 = store.insert_process(process_at(ProcessKind::Pooling, 1, "t")).unwrap();
    store.insert_record(ProcessRecord::new(p1).with_input(a).with_output(b)).unwrap();
    store.insert_record(ProcessRecord::new(p2).with_input(b).with_output(a)).unwrap();

    let walker = ProvenanceWalker::new(&store);
    let history = walker.ancestry(EntityRef::Artifact(a));
    assert_eq!(history.len(), 2);
}

#[test]
fn descendants_nest_along_the_pipeline() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let walker = ProvenanceWalker::new(&store);

    let tree = walker.descendants(EntityRef::Artifact(fx.biosample));
    assert_eq!(tree.len(), 1);
    let total: usize = tree.iter().map(LineageNode::record_count).sum();
    // pooling, sequencing, pipeline, publication
    assert_eq!(total, 4);

    let pooling = &tree[0];
    assert_eq!(pooling.record.process, fx.pooling);
    assert_eq!(pooling.children.len(), 1);
    assert_eq!(pooling.children[0].record.process, fx.sequencing);
}

#[test]
fn bridge_blocks_branch_not_reached_through_it() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let seed = tube(&store, home, "seed");
    let cousin = tube(&store, home, "cousin");
    let shared = tube(&store, home, "shared-checkpoint");

    let p = store.insert_process(process_at(ProcessKind::Pooling, 0, "t")).unwrap();
    store
        .insert_record(ProcessRecord::new(p).with_input(seed).with_output(cousin).bridged_by(shared))
        .unwrap();

    // The traversal never encountered the bridge, so the branch is pruned.
    let walker = ProvenanceWalker::new(&store);
    assert!(walker.descendants(EntityRef::Artifact(seed)).is_empty());
}

#[test]
fn bridge_opens_after_being_crossed() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let seed = tube(&store, home, "seed");
    let shared = tube(&store, home, "shared-checkpoint");
    let downstream = tube(&store, home, "downstream");

    let p1 = store.insert_process(process_at(ProcessKind::Pooling, 0, "t")).unwrap();
    let p2 = store.insert_process(process_at(ProcessKind::Pooling, 1, "t")).unwrap();
    store.insert_record(ProcessRecord::new(p1).with_input(seed).with_output(shared)).unwrap();
    store
        .insert_record(
            ProcessRecord::new(p2).with_input(shared).with_output(downstream).bridged_by(shared),
        )
        .unwrap();

    let walker = ProvenanceWalker::new(&store);
    let tree = walker.descendants(EntityRef::Artifact(seed));
    let total: usize = tree.iter().map(LineageNode::record_count).sum();
    assert_eq!(total, 2);
}

#[test]
fn seed_entity_counts_as_crossed() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let shared = tube(&store, home, "shared-checkpoint");
    let downstream = tube(&store, home, "downstream");

    let p = store.insert_process(process_at(ProcessKind::Pooling, 0, "t")).unwrap();
    store
        .insert_record(
            ProcessRecord::new(p).with_input(shared).with_output(downstream).bridged_by(shared),
        )
        .unwrap();

    let walker = ProvenanceWalker::new(&store);
    assert_eq!(walker.descendants(EntityRef::Artifact(shared)).len(), 1);
}

#[test]
fn reaching_a_group_descends_into_its_members() {
    let store = EntityStore::new();
    let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
    let bundle = store
        .insert_group(Group::new(GroupKind::PublishedArtifactGroup, "PAG"))
        .unwrap();
    let seed = tube(&store, home, "seed");
    let member = store
        .insert_artifact(Artifact::new(ArtifactKind::DigitalFile, "m.fa").in_group(bundle))
        .unwrap();
    let derived = tube(&store, home, "derived");

    let publish = store.insert_process(process_at(ProcessKind::Publication, 0, "t")).unwrap();
    let follow = store.insert_process(process_at(ProcessKind::PipelineRun, 1, "t")).unwrap();
    store.insert_record(ProcessRecord::new(publish).with_input(seed).with_output(bundle)).unwrap();
    store.insert_record(ProcessRecord::new(follow).with_input(member).with_output(derived)).unwrap();

    let walker = ProvenanceWalker::new(&store);
    let tree = walker.descendants(EntityRef::Artifact(seed));
    assert_eq!(tree.len(), 1);
    // The member's own consuming record is merged into the same subtree.
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].record.process, follow);
}

#[test]
fn collect_group_artifacts_spans_tags_members_and_children() {
    let store = EntityStore::new();
    let fx = build_sample_pipeline(&store);
    let child = store
        .insert_group(Group::new(GroupKind::Directory, "reads").child_of(fx.pag))
        .unwrap();
    let nested = store
        .insert_artifact(Artifact::new(ArtifactKind::DigitalFile, "reads.bam").in_group(child))
        .unwrap();

    let walker = ProvenanceWalker::new(&store);
    let collected = walker.collect_group_artifacts(fx.pag);
    assert!(collected.contains(&fx.consensus));
    assert!(collected.contains(&nested));
}

proptest! {
    // Termination on arbitrary graphs, cycles and bridges included: every
    // record is visited at most once per traversal.
    #[test]
    fn prop_traversals_terminate(
        n in 2..10usize,
        edges in proptest::collection::vec(
            (0..10usize, 0..10usize, proptest::option::of(0..10usize)),
            0..40
        )
    ) {
        let store = EntityStore::new();
        let home = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
        let ids: Vec<ArtifactId> = (0..n)
            .map(|i| tube(&store, home, &format!("T{i}")))
            .collect();

        for (offset, (from, to, bridge)) in edges.into_iter().enumerate() {
            if from < n && to < n {
                let process = store
                    .insert_process(process_at(ProcessKind::Pooling, offset as i64, "t"))
                    .unwrap();
                let mut record = ProcessRecord::new(process)
                    .with_input(ids[from])
                    .with_output(ids[to]);
                if let Some(b) = bridge {
                    if b < n {
                        record = record.bridged_by(ids[b]);
                    }
                }
                store.insert_record(record).unwrap();
            }
        }

        let walker = ProvenanceWalker::new(&store);
        for id in &ids {
            let history = walker.ancestry(EntityRef::Artifact(*id));
            prop_assert!(history.len() <= store.record_count());

            let tree = walker.descendants(EntityRef::Artifact(*id));
            let visited: usize = tree.iter().map(LineageNode::record_count).sum();
            prop_assert!(visited <= store.record_count());
        }
    }
}
