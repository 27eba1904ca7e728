//! Metric and metadata aggregation
//!
//! Collapses the metrics and metadata of every artifact belonging to a
//! target group into flat lookup tables. The model assumes one artifact per
//! metric namespace per group: two artifacts supplying the same key with
//! different values is a conflict and aborts the evaluation.

use crate::error::QcError;
use prov_entity::{ArtifactId, EntityStore, MetaTarget};
use std::collections::{BTreeMap, HashMap};

/// Aggregated metric values keyed by namespace
#[derive(Debug, Clone, Default)]
pub struct AggregatedMetrics {
    by_namespace: HashMap<String, BTreeMap<String, f64>>,
}

impl AggregatedMetrics {
    /// Value of `namespace.name`, if supplied by any tagged artifact
    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<f64> {
        self.by_namespace.get(namespace).and_then(|values| values.get(name).copied())
    }

    /// Whether nothing was aggregated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_namespace.is_empty()
    }

    /// Build directly from (namespace, values) pairs
    #[must_use]
    pub fn from_parts(parts: impl IntoIterator<Item = (String, BTreeMap<String, f64>)>) -> Self {
        Self { by_namespace: parts.into_iter().collect() }
    }
}

/// Aggregated metadata keyed by (tag, name)
#[derive(Debug, Clone, Default)]
pub struct AggregatedMetadata {
    by_key: HashMap<(String, String), String>,
}

impl AggregatedMetadata {
    /// Value of `tag.name`, if supplied by any tagged artifact
    #[must_use]
    pub fn get(&self, tag: &str, name: &str) -> Option<&str> {
        self.by_key.get(&(tag.to_string(), name.to_string())).map(String::as_str)
    }
}

/// Collect every metric namespace across `artifacts`
///
/// # Errors
/// Fails when two artifacts supply the same namespace with different
/// values.
pub fn aggregate_metrics(
    store: &EntityStore,
    artifacts: &[ArtifactId],
) -> Result<AggregatedMetrics, QcError> {
    let mut out = AggregatedMetrics::default();
    for artifact in artifacts {
        for metric in store.metrics_for(*artifact) {
            match out.by_namespace.get(&metric.namespace) {
                None => {
                    out.by_namespace.insert(metric.namespace.clone(), metric.values.clone());
                }
                Some(existing) if *existing == metric.values => {}
                Some(existing) => {
                    tracing::warn!(namespace = %metric.namespace, "conflicting metric values in group");
                    return Err(QcError::Conflict {
                        key: metric.namespace.clone(),
                        left: format!("{existing:?}"),
                        right: format!("{:?}", metric.values),
                    });
                }
            }
        }
    }
    Ok(out)
}

/// Collect every metadata record across `artifacts`, keyed by (tag, name)
///
/// # Errors
/// Fails when two artifacts supply the same key with different values.
pub fn aggregate_metadata(
    store: &EntityStore,
    artifacts: &[ArtifactId],
) -> Result<AggregatedMetadata, QcError> {
    let mut out = AggregatedMetadata::default();
    for artifact in artifacts {
        for record in store.meta_for(MetaTarget::Artifact(*artifact)) {
            let key = (record.tag.clone(), record.name.clone());
            match out.by_key.get(&key) {
                None => {
                    out.by_key.insert(key, record.value);
                }
                Some(existing) if *existing == record.value => {}
                Some(existing) => {
                    tracing::warn!(tag = %record.tag, name = %record.name, "conflicting metadata in group");
                    return Err(QcError::Conflict {
                        key: format!("{}.{}", record.tag, record.name),
                        left: existing.clone(),
                        right: record.value,
                    });
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_entity::{Artifact, ArtifactKind, Group, GroupKind, MetaRecord, Metric};

    fn two_artifacts(store: &EntityStore) -> (ArtifactId, ArtifactId) {
        let group = store.insert_group(Group::new(GroupKind::Rack, "R")).unwrap();
        let a = store
            .insert_artifact(Artifact::new(ArtifactKind::DigitalFile, "a").in_group(group))
            .unwrap();
        let b = store
            .insert_artifact(Artifact::new(ArtifactKind::DigitalFile, "b").in_group(group))
            .unwrap();
        (a, b)
    }

    #[test]
    fn distinct_namespaces_merge() {
        let store = EntityStore::new();
        let (a, b) = two_artifacts(&store);
        store
            .insert_metric(Metric::new(a, "sequence").with_value("pc_acgt", 0.95))
            .unwrap();
        store
            .insert_metric(Metric::new(b, "mapping").with_value("pc_pos_cov_gte10", 0.8))
            .unwrap();

        let metrics = aggregate_metrics(&store, &[a, b]).unwrap();
        assert_eq!(metrics.get("sequence", "pc_acgt"), Some(0.95));
        assert_eq!(metrics.get("mapping", "pc_pos_cov_gte10"), Some(0.8));
    }

    #[test]
    fn identical_duplicate_namespace_is_tolerated() {
        let store = EntityStore::new();
        let (a, b) = two_artifacts(&store);
        store
            .insert_metric(Metric::new(a, "sequence").with_value("pc_acgt", 0.95))
            .unwrap();
        store
            .insert_metric(Metric::new(b, "sequence").with_value("pc_acgt", 0.95))
            .unwrap();
        assert!(aggregate_metrics(&store, &[a, b]).is_ok());
    }

    #[test]
    fn conflicting_namespace_aborts() {
        let store = EntityStore::new();
        let (a, b) = two_artifacts(&store);
        store
            .insert_metric(Metric::new(a, "sequence").with_value("pc_acgt", 0.95))
            .unwrap();
        store
            .insert_metric(Metric::new(b, "sequence").with_value("pc_acgt", 0.90))
            .unwrap();

        let err = aggregate_metrics(&store, &[a, b]).unwrap_err();
        assert!(matches!(err, QcError::Conflict { ref key, .. } if key == "sequence"));
    }

    #[test]
    fn conflicting_metadata_aborts_with_key() {
        let store = EntityStore::new();
        let (a, b) = two_artifacts(&store);
        store
            .insert_meta(MetaRecord::new(MetaTarget::Artifact(a), "collection", "county", "Kent"))
            .unwrap();
        store
            .insert_meta(MetaRecord::new(MetaTarget::Artifact(b), "collection", "county", "Essex"))
            .unwrap();

        let err = aggregate_metadata(&store, &[a, b]).unwrap_err();
        assert!(matches!(err, QcError::Conflict { ref key, .. } if key == "collection.county"));
    }
}
