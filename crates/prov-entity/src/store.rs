//! Concurrent entity store
//!
//! In-process store for all provenance entities with referential integrity
//! on insert and the secondary indices the graph walker and the QC engine
//! traverse. Reads never take exclusive locks; every table is a concurrent
//! map and callers get cloned snapshots.
//!
//! Entities are append-only in normal operation. The one deleting operation
//! is [`EntityStore::nuke_group`], an explicit cascade that detaches tag
//! links before removing descendants.

use crate::artifact::Artifact;
use crate::audit::{AuditAction, AuditLog};
use crate::error::StoreError;
use crate::group::Group;
use crate::ids::{
    ArtifactId, EntityRef, GroupId, MetaRecordId, MetaTarget, MetricId, ProcessId, ProcessRecordId,
};
use crate::metric::{MetaRecord, Metric};
use crate::process::{Process, ProcessRecord};
use dashmap::DashMap;

/// Concurrent store for provenance entities
///
/// # Concurrency
/// All methods take `&self`. Mutations touch one table at a time; readers
/// running concurrently with writers see each table's latest committed
/// state, which is all the graph walker requires (no snapshot isolation).
#[derive(Debug, Default)]
pub struct EntityStore {
    artifacts: DashMap<ArtifactId, Artifact>,
    groups: DashMap<GroupId, Group>,
    processes: DashMap<ProcessId, Process>,
    records: DashMap<ProcessRecordId, ProcessRecord>,
    metrics: DashMap<MetricId, Metric>,
    meta: DashMap<MetaRecordId, MetaRecord>,

    // Secondary indices, maintained on insert
    records_by_out: DashMap<EntityRef, Vec<ProcessRecordId>>,
    records_by_in: DashMap<EntityRef, Vec<ProcessRecordId>>,
    records_by_process: DashMap<ProcessId, Vec<ProcessRecordId>>,
    artifacts_by_tag: DashMap<GroupId, Vec<ArtifactId>>,
    artifacts_by_group: DashMap<GroupId, Vec<ArtifactId>>,
    groups_by_parent: DashMap<GroupId, Vec<GroupId>>,
    groups_by_tag: DashMap<GroupId, Vec<GroupId>>,
    metrics_by_artifact: DashMap<ArtifactId, Vec<MetricId>>,
    meta_by_target: DashMap<MetaTarget, Vec<MetaRecordId>>,

    audit: AuditLog,
}

impl EntityStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The store's audit log
    #[inline]
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    fn entity_exists(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Artifact(id) => self.artifacts.contains_key(&id),
            EntityRef::Group(id) => self.groups.contains_key(&id),
        }
    }

    fn check_entity(&self, entity: EntityRef) -> Result<(), StoreError> {
        if self.entity_exists(entity) {
            return Ok(());
        }
        match entity {
            EntityRef::Artifact(id) => Err(StoreError::UnknownArtifact(id)),
            EntityRef::Group(id) => Err(StoreError::UnknownGroup(id)),
        }
    }

    // ---- inserts ----------------------------------------------------------

    /// Insert an artifact
    ///
    /// # Errors
    /// Fails on duplicate id or when a referenced group, process, or root
    /// artifact is not stored.
    pub fn insert_artifact(&self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        if self.artifacts.contains_key(&artifact.id) {
            return Err(StoreError::DuplicateId(artifact.id.to_string()));
        }
        if let Some(group) = artifact.primary_group {
            if !self.groups.contains_key(&group) {
                return Err(StoreError::UnknownGroup(group));
            }
        }
        for tag in &artifact.tags {
            if !self.groups.contains_key(tag) {
                return Err(StoreError::UnknownGroup(*tag));
            }
        }
        if let Some(process) = artifact.created {
            if !self.processes.contains_key(&process) {
                return Err(StoreError::UnknownProcess(process));
            }
        }
        if let Some(root) = artifact.root_artifact {
            if !self.artifacts.contains_key(&root) {
                return Err(StoreError::UnknownArtifact(root));
            }
        }

        let id = artifact.id;
        if let Some(group) = artifact.primary_group {
            self.artifacts_by_group.entry(group).or_default().push(id);
        }
        for tag in &artifact.tags {
            self.artifacts_by_tag.entry(*tag).or_default().push(id);
        }
        self.artifacts.insert(id, artifact);
        Ok(id)
    }

    /// Insert a group
    ///
    /// # Errors
    /// Fails on duplicate id or unknown parent/tag groups.
    pub fn insert_group(&self, group: Group) -> Result<GroupId, StoreError> {
        if self.groups.contains_key(&group.id) {
            return Err(StoreError::DuplicateId(group.id.to_string()));
        }
        if let Some(parent) = group.parent {
            if !self.groups.contains_key(&parent) {
                return Err(StoreError::UnknownGroup(parent));
            }
        }
        for tag in &group.tags {
            if !self.groups.contains_key(tag) {
                return Err(StoreError::UnknownGroup(*tag));
            }
        }

        let id = group.id;
        if let Some(parent) = group.parent {
            self.groups_by_parent.entry(parent).or_default().push(id);
        }
        for tag in &group.tags {
            self.groups_by_tag.entry(*tag).or_default().push(id);
        }
        self.groups.insert(id, group);
        Ok(id)
    }

    /// Insert a process
    ///
    /// # Errors
    /// Fails on duplicate id.
    pub fn insert_process(&self, process: Process) -> Result<ProcessId, StoreError> {
        if self.processes.contains_key(&process.id) {
            return Err(StoreError::DuplicateId(process.id.to_string()));
        }
        let id = process.id;
        self.processes.insert(id, process);
        Ok(id)
    }

    /// Insert a process record
    ///
    /// # Errors
    /// Fails when the owning process or any referenced end is not stored.
    pub fn insert_record(&self, record: ProcessRecord) -> Result<ProcessRecordId, StoreError> {
        if self.records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id.to_string()));
        }
        if !self.processes.contains_key(&record.process) {
            return Err(StoreError::UnknownProcess(record.process));
        }
        for end in [record.in_ref, record.out_ref, record.bridge].into_iter().flatten() {
            self.check_entity(end)?;
        }

        let id = record.id;
        if let Some(input) = record.in_ref {
            self.records_by_in.entry(input).or_default().push(id);
        }
        if let Some(output) = record.out_ref {
            self.records_by_out.entry(output).or_default().push(id);
        }
        self.records_by_process.entry(record.process).or_default().push(id);
        self.records.insert(id, record);
        Ok(id)
    }

    /// Insert a metric namespace
    ///
    /// # Errors
    /// Fails when the owning artifact is not stored.
    pub fn insert_metric(&self, metric: Metric) -> Result<MetricId, StoreError> {
        if !self.artifacts.contains_key(&metric.artifact) {
            return Err(StoreError::UnknownArtifact(metric.artifact));
        }
        let id = metric.id;
        self.metrics_by_artifact.entry(metric.artifact).or_default().push(id);
        self.metrics.insert(id, metric);
        Ok(id)
    }

    /// Insert a metadata record
    ///
    /// # Errors
    /// Fails when the target entity is not stored.
    pub fn insert_meta(&self, record: MetaRecord) -> Result<MetaRecordId, StoreError> {
        let target_exists = match record.target {
            MetaTarget::Artifact(id) => self.artifacts.contains_key(&id),
            MetaTarget::Group(id) => self.groups.contains_key(&id),
            MetaTarget::Process(id) => self.processes.contains_key(&id),
            MetaTarget::ProcessRecord(id) => self.records.contains_key(&id),
        };
        if !target_exists {
            return Err(StoreError::UnknownTarget(record.target));
        }
        let id = record.id;
        self.meta_by_target.entry(record.target).or_default().push(id);
        self.meta.insert(id, record);
        Ok(id)
    }

    // ---- lookups ----------------------------------------------------------

    /// Artifact by id
    #[must_use]
    pub fn get_artifact(&self, id: ArtifactId) -> Option<Artifact> {
        self.artifacts.get(&id).map(|a| a.clone())
    }

    /// Group by id
    #[must_use]
    pub fn get_group(&self, id: GroupId) -> Option<Group> {
        self.groups.get(&id).map(|g| g.clone())
    }

    /// Process by id
    #[must_use]
    pub fn get_process(&self, id: ProcessId) -> Option<Process> {
        self.processes.get(&id).map(|p| p.clone())
    }

    /// Process record by id
    #[must_use]
    pub fn get_record(&self, id: ProcessRecordId) -> Option<ProcessRecord> {
        self.records.get(&id).map(|r| r.clone())
    }

    fn resolve_records(&self, ids: Option<Vec<ProcessRecordId>>) -> Vec<ProcessRecord> {
        ids.unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.get_record(id))
            .collect()
    }

    /// Records whose output end is `entity` (the edges that produced it)
    #[must_use]
    pub fn records_producing(&self, entity: EntityRef) -> Vec<ProcessRecord> {
        self.resolve_records(self.records_by_out.get(&entity).map(|v| v.clone()))
    }

    /// Records whose input end is `entity` (the edges consuming it downstream)
    #[must_use]
    pub fn records_consuming(&self, entity: EntityRef) -> Vec<ProcessRecord> {
        self.resolve_records(self.records_by_in.get(&entity).map(|v| v.clone()))
    }

    /// All records belonging to one process
    #[must_use]
    pub fn records_for_process(&self, process: ProcessId) -> Vec<ProcessRecord> {
        self.resolve_records(self.records_by_process.get(&process).map(|v| v.clone()))
    }

    /// Artifacts labeled with the tag group
    #[must_use]
    pub fn artifacts_tagged(&self, tag: GroupId) -> Vec<ArtifactId> {
        self.artifacts_by_tag.get(&tag).map(|v| v.clone()).unwrap_or_default()
    }

    /// Artifacts whose primary group is `group`
    #[must_use]
    pub fn group_members(&self, group: GroupId) -> Vec<ArtifactId> {
        self.artifacts_by_group.get(&group).map(|v| v.clone()).unwrap_or_default()
    }

    /// Direct child groups of `group`
    #[must_use]
    pub fn child_groups(&self, group: GroupId) -> Vec<GroupId> {
        self.groups_by_parent.get(&group).map(|v| v.clone()).unwrap_or_default()
    }

    /// Metric namespaces attached to an artifact
    #[must_use]
    pub fn metrics_for(&self, artifact: ArtifactId) -> Vec<Metric> {
        self.metrics_by_artifact
            .get(&artifact)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.metrics.get(&id).map(|m| m.clone()))
            .collect()
    }

    /// Metadata records attached to a target
    #[must_use]
    pub fn meta_for(&self, target: MetaTarget) -> Vec<MetaRecord> {
        self.meta_by_target
            .get(&target)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.meta.get(&id).map(|m| m.clone()))
            .collect()
    }

    /// Groups matching a display name
    #[must_use]
    pub fn groups_named(&self, name: &str) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone())
            .collect()
    }

    // ---- mutations --------------------------------------------------------

    /// Label an existing artifact with a tag group
    ///
    /// # Errors
    /// Fails when either side is unknown.
    pub fn tag_artifact(&self, artifact: ArtifactId, tag: GroupId) -> Result<(), StoreError> {
        if !self.groups.contains_key(&tag) {
            return Err(StoreError::UnknownGroup(tag));
        }
        let mut entry = self
            .artifacts
            .get_mut(&artifact)
            .ok_or(StoreError::UnknownArtifact(artifact))?;
        if entry.tags.insert(tag) {
            drop(entry);
            self.artifacts_by_tag.entry(tag).or_default().push(artifact);
        }
        Ok(())
    }

    /// Label an existing group with a tag group
    ///
    /// # Errors
    /// Fails when either side is unknown.
    pub fn tag_group(&self, group: GroupId, tag: GroupId) -> Result<(), StoreError> {
        if !self.groups.contains_key(&tag) {
            return Err(StoreError::UnknownGroup(tag));
        }
        let mut entry = self.groups.get_mut(&group).ok_or(StoreError::UnknownGroup(group))?;
        if entry.tags.insert(tag) {
            drop(entry);
            self.groups_by_tag.entry(tag).or_default().push(group);
        }
        Ok(())
    }

    /// Flip an artifact's quarantine flag, recording the flip in the audit log
    ///
    /// # Errors
    /// Fails when the artifact is unknown.
    pub fn set_quarantined(
        &self,
        artifact: ArtifactId,
        quarantined: bool,
        actor: &str,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .artifacts
            .get_mut(&artifact)
            .ok_or(StoreError::UnknownArtifact(artifact))?;
        entry.quarantined = quarantined;
        drop(entry);
        let action = if quarantined { AuditAction::Quarantine } else { AuditAction::Release };
        self.audit.append(actor, action, EntityRef::Artifact(artifact).to_string());
        Ok(())
    }

    /// Cascading group delete
    ///
    /// Detaches every tag link referencing the group, then recursively
    /// removes child groups, member artifacts (with their metrics and
    /// metadata), and finally the group itself. Process records survive as
    /// historical events but are dropped from the traversal indices of the
    /// removed entities.
    ///
    /// # Errors
    /// Fails when the group is unknown.
    pub fn nuke_group(&self, group: GroupId, actor: &str) -> Result<(), StoreError> {
        if !self.groups.contains_key(&group) {
            return Err(StoreError::UnknownGroup(group));
        }
        tracing::info!(group = %group, "nuking group");
        self.nuke_inner(group);
        self.audit.append(actor, AuditAction::NukeGroup, EntityRef::Group(group).to_string());
        Ok(())
    }

    fn nuke_inner(&self, group: GroupId) {
        // Detach tag links first so labels never dangle on survivors.
        if let Some((_, tagged)) = self.artifacts_by_tag.remove(&group) {
            for artifact in tagged {
                if let Some(mut entry) = self.artifacts.get_mut(&artifact) {
                    entry.tags.remove(&group);
                }
            }
        }
        if let Some((_, tagged)) = self.groups_by_tag.remove(&group) {
            for other in tagged {
                if let Some(mut entry) = self.groups.get_mut(&other) {
                    entry.tags.remove(&group);
                }
            }
        }

        for child in self.child_groups(group) {
            self.nuke_inner(child);
        }
        for artifact in self.group_members(group) {
            self.remove_artifact(artifact);
        }

        if let Some(parent) = self.groups.get(&group).and_then(|g| g.parent) {
            if let Some(mut siblings) = self.groups_by_parent.get_mut(&parent) {
                siblings.retain(|id| *id != group);
            }
        }
        self.groups_by_parent.remove(&group);
        self.artifacts_by_group.remove(&group);
        self.records_by_in.remove(&EntityRef::Group(group));
        self.records_by_out.remove(&EntityRef::Group(group));
        self.meta_by_target.remove(&MetaTarget::Group(group));
        self.groups.remove(&group);
    }

    fn remove_artifact(&self, artifact: ArtifactId) {
        if let Some((_, metric_ids)) = self.metrics_by_artifact.remove(&artifact) {
            for id in metric_ids {
                self.metrics.remove(&id);
            }
        }
        if let Some((_, meta_ids)) = self.meta_by_target.remove(&MetaTarget::Artifact(artifact)) {
            for id in meta_ids {
                self.meta.remove(&id);
            }
        }
        if let Some(entry) = self.artifacts.get(&artifact) {
            let tags: Vec<GroupId> = entry.tags.iter().copied().collect();
            drop(entry);
            for tag in tags {
                if let Some(mut index) = self.artifacts_by_tag.get_mut(&tag) {
                    index.retain(|id| *id != artifact);
                }
            }
        }
        self.records_by_in.remove(&EntityRef::Artifact(artifact));
        self.records_by_out.remove(&EntityRef::Artifact(artifact));
        self.artifacts.remove(&artifact);
    }

    // ---- counts (test and diagnostic support) -----------------------------

    /// Number of stored artifacts
    #[inline]
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Number of stored groups
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of stored process records
    #[inline]
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
