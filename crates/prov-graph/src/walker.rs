//! Ancestry and descendant traversal
//!
//! Both walks carry their visited state as per-call owned sets, so any call
//! terminates on any graph, cyclic or not, and no state is ever shared
//! between invocations. Downward traversal additionally enforces bridge
//! gating: a record carrying a bridge is only followed once the bridge
//! entity has been encountered earlier in the same traversal.

use crate::error::GraphError;
use prov_entity::{
    ArtifactId, EntityRef, EntityStore, GroupId, Process, ProcessId, ProcessRecord,
};
use serde::Serialize;
use std::collections::HashSet;

/// Read-mostly view over an [`EntityStore`] exposing traversal operations
#[derive(Debug, Clone, Copy)]
pub struct ProvenanceWalker<'a> {
    store: &'a EntityStore,
}

/// One node of a descendant tree: a process record and the subtrees hanging
/// off its output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageNode {
    /// The traversed record
    pub record: ProcessRecord,
    /// Subtrees reached through the record's output end
    pub children: Vec<LineageNode>,
}

impl LineageNode {
    /// Total number of records in this node and its subtrees
    #[must_use]
    pub fn record_count(&self) -> usize {
        1 + self.children.iter().map(LineageNode::record_count).sum::<usize>()
    }
}

impl<'a> ProvenanceWalker<'a> {
    /// Create a walker over `store`
    #[inline]
    #[must_use]
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// The underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &'a EntityStore {
        self.store
    }

    /// Ordered process history of an entity, earliest first
    ///
    /// Recursively follows the input ends of the records that produced the
    /// entity and its ancestors. Each record is visited at most once per
    /// call, so the walk terminates even on cyclic graphs. Accumulation is
    /// newest-first by process timestamp; the returned sequence is reversed
    /// to read earliest-first.
    #[must_use]
    pub fn ancestry(&self, entity: EntityRef) -> Vec<Process> {
        let mut visited: HashSet<prov_entity::ProcessRecordId> = HashSet::new();
        let mut seen_processes: HashSet<ProcessId> = HashSet::new();
        let mut acc: Vec<Process> = Vec::new();
        self.walk_up(entity, &mut visited, &mut seen_processes, &mut acc);

        acc.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        acc.reverse();
        acc
    }

    fn walk_up(
        &self,
        entity: EntityRef,
        visited: &mut HashSet<prov_entity::ProcessRecordId>,
        seen_processes: &mut HashSet<ProcessId>,
        acc: &mut Vec<Process>,
    ) {
        for record in self.store.records_producing(entity) {
            if !visited.insert(record.id) {
                continue;
            }
            if seen_processes.insert(record.process) {
                if let Some(process) = self.store.get_process(record.process) {
                    acc.push(process);
                }
            }
            if let Some(input) = record.in_ref {
                self.walk_up(input, visited, seen_processes, acc);
            }
        }
    }

    /// Descendant tree of an entity with bridge gating
    ///
    /// Walks the records consuming the entity and its discovered
    /// descendants. A record carrying a bridge is pruned unless the bridge
    /// entity was already encountered in this traversal; the crossed set
    /// starts as `{entity}`. The check consults only the current entity's
    /// own adjacent records, not the full path taken to reach it.
    ///
    /// When a record's output is a group, the walk also descends one level
    /// into the group's members and merges their subtrees into the same
    /// node.
    #[must_use]
    pub fn descendants(&self, entity: EntityRef) -> Vec<LineageNode> {
        let mut seen: HashSet<EntityRef> = HashSet::new();
        let mut crossed: HashSet<EntityRef> = HashSet::new();
        self.walk_down(entity, &mut seen, &mut crossed)
    }

    fn walk_down(
        &self,
        entity: EntityRef,
        seen: &mut HashSet<EntityRef>,
        crossed: &mut HashSet<EntityRef>,
    ) -> Vec<LineageNode> {
        if !seen.insert(entity) {
            return Vec::new();
        }
        crossed.insert(entity);

        let mut nodes = Vec::new();
        for record in self.store.records_consuming(entity) {
            if let Some(bridge) = record.bridge {
                if !crossed.contains(&bridge) {
                    tracing::debug!(record = %record.id, bridge = %bridge, "pruning branch behind uncrossed bridge");
                    continue;
                }
            }

            let mut children = Vec::new();
            if let Some(output) = record.out_ref {
                children.extend(self.walk_down(output, seen, crossed));
                if let EntityRef::Group(group) = output {
                    for member in self.store.group_members(group) {
                        children.extend(self.walk_down(EntityRef::Artifact(member), seen, crossed));
                    }
                }
            }
            nodes.push(LineageNode { record, children });
        }
        nodes
    }

    /// Every artifact belonging to a group, for metric aggregation
    ///
    /// The union of artifacts tagged to the group, the group's primary
    /// members, and the members of its child groups, in discovery order
    /// without duplicates.
    #[must_use]
    pub fn collect_group_artifacts(&self, group: GroupId) -> Vec<ArtifactId> {
        let mut out: Vec<ArtifactId> = Vec::new();
        let mut dedup: HashSet<ArtifactId> = HashSet::new();
        let mut groups = vec![group];
        let mut visited_groups: HashSet<GroupId> = HashSet::new();

        while let Some(current) = groups.pop() {
            if !visited_groups.insert(current) {
                continue;
            }
            for artifact in self
                .store
                .artifacts_tagged(current)
                .into_iter()
                .chain(self.store.group_members(current))
            {
                if dedup.insert(artifact) {
                    out.push(artifact);
                }
            }
            groups.extend(self.store.child_groups(current));
        }
        out
    }

    /// Resolve the quarantine cause of an artifact, if any
    ///
    /// Returns the artifact itself when its own flag is set. Otherwise a
    /// set `root_artifact` answers for the whole derivative chain. Failing
    /// both, the ancestry of the artifact is scanned for the first adjacent
    /// in/out artifact whose flag is set. Read-only.
    #[must_use]
    pub fn is_quarantined(&self, artifact: ArtifactId) -> Option<ArtifactId> {
        let subject = self.store.get_artifact(artifact)?;
        if subject.quarantined {
            return Some(subject.id);
        }
        if let Some(root_id) = subject.root_artifact {
            let root = self.store.get_artifact(root_id)?;
            return root.quarantined.then_some(root.id);
        }

        for process in self.ancestry(EntityRef::Artifact(artifact)) {
            for record in self.store.records_for_process(process.id) {
                for end in [record.in_ref, record.out_ref].into_iter().flatten() {
                    if let EntityRef::Artifact(id) = end {
                        if self.store.get_artifact(id).is_some_and(|a| a.quarantined) {
                            return Some(id);
                        }
                    }
                }
            }
        }
        None
    }

    /// Quarantine an artifact, citing `process` as the cause
    ///
    /// Writes the audit record first (the cause process, the artifact as
    /// both input and output, the note), then flips the flag. The ordering
    /// guarantees [`Self::quarantine_reason`] can always resolve the note
    /// from record history.
    ///
    /// # Errors
    /// Fails when the process or artifact is unknown.
    pub fn quarantine(
        &self,
        process: ProcessId,
        artifact: ArtifactId,
        note: &str,
    ) -> Result<prov_entity::ProcessRecordId, GraphError> {
        let cause = self
            .store
            .get_process(process)
            .ok_or(GraphError::UnknownProcess(process))?;
        if self.store.get_artifact(artifact).is_none() {
            return Err(GraphError::UnknownArtifact(artifact));
        }

        let record = ProcessRecord::new(process)
            .with_input(artifact)
            .with_output(artifact)
            .with_note(note);
        let record_id = self.store.insert_record(record)?;
        self.store.set_quarantined(artifact, true, &cause.actor)?;
        tracing::info!(artifact = %artifact, process = %process, "artifact quarantined");
        Ok(record_id)
    }

    /// The note recorded when the governing quarantine was flagged
    ///
    /// Resolves the offending artifact via [`Self::is_quarantined`], then
    /// reads the note from its flagging record (the self-edge written by
    /// [`Self::quarantine`]). Returns the most recent note when the
    /// artifact was flagged more than once.
    #[must_use]
    pub fn quarantine_reason(&self, artifact: ArtifactId) -> Option<String> {
        let offender = self.is_quarantined(artifact)?;
        let own = EntityRef::Artifact(offender);
        self.store
            .records_producing(own)
            .into_iter()
            .filter(|r| r.in_ref == Some(own) && r.out_ref == Some(own))
            .filter_map(|r| r.note)
            .next_back()
    }
}
