//! Concurrent registry of quality test definitions
//!
//! Holds equivalence groups, tests, versions, rules, and decisions with
//! referential checks on registration. The latest-version invariant is
//! enforced here: publishing a version atomically clears the previous
//! holder under one lock, never as a side effect of an unrelated save.

use crate::error::RegistryError;
use crate::model::{
    Decision, DecisionId, EquivalenceGroupId, QualityTest, Rule, RuleId, TestEquivalenceGroup,
    TestId, TestVersion, TestVersionId,
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Concurrent store for versioned quality test definitions
#[derive(Debug, Default)]
pub struct TestRegistry {
    groups: DashMap<EquivalenceGroupId, TestEquivalenceGroup>,
    tests: DashMap<TestId, QualityTest>,
    versions: DashMap<TestVersionId, TestVersion>,
    rules: DashMap<RuleId, Rule>,
    decisions: DashMap<DecisionId, Decision>,

    versions_by_test: DashMap<TestId, Vec<TestVersionId>>,
    rules_by_version: DashMap<TestVersionId, Vec<RuleId>>,
    decisions_by_version: DashMap<TestVersionId, Vec<DecisionId>>,

    // Serializes the is_latest swap in publish_version
    publish_lock: Mutex<()>,
}

impl TestRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- registration -----------------------------------------------------

    /// Register an equivalence group
    ///
    /// # Errors
    /// Fails when a member test is not registered.
    pub fn register_group(
        &self,
        group: TestEquivalenceGroup,
    ) -> Result<EquivalenceGroupId, RegistryError> {
        for test in &group.tests {
            if !self.tests.contains_key(test) {
                return Err(RegistryError::UnknownTest(*test));
            }
        }
        let id = group.id;
        self.groups.insert(id, group);
        Ok(id)
    }

    /// Register a test definition
    #[must_use = "the returned id is the only handle to the registered test"]
    pub fn register_test(&self, test: QualityTest) -> TestId {
        let id = test.id;
        self.tests.insert(id, test);
        id
    }

    /// Append a registered test to an equivalence group
    ///
    /// # Errors
    /// Fails when either side is unknown.
    pub fn add_test_to_group(
        &self,
        group: EquivalenceGroupId,
        test: TestId,
    ) -> Result<(), RegistryError> {
        if !self.tests.contains_key(&test) {
            return Err(RegistryError::UnknownTest(test));
        }
        let mut entry = self.groups.get_mut(&group).ok_or(RegistryError::UnknownGroup(group))?;
        if !entry.tests.contains(&test) {
            entry.tests.push(test);
        }
        Ok(())
    }

    /// Publish the next version of a test
    ///
    /// Assigns the next version number and makes the new version latest,
    /// clearing the previous holder in the same critical section.
    ///
    /// # Errors
    /// Fails when the test is not registered.
    pub fn publish_version(&self, test: TestId) -> Result<TestVersion, RegistryError> {
        if !self.tests.contains_key(&test) {
            return Err(RegistryError::UnknownTest(test));
        }

        let _guard = self.publish_lock.lock();
        let existing = self.versions_by_test.get(&test).map(|v| v.clone()).unwrap_or_default();
        let next_number = existing
            .iter()
            .filter_map(|id| self.versions.get(id).map(|v| v.version_number))
            .max()
            .unwrap_or(0)
            + 1;
        for id in &existing {
            if let Some(mut version) = self.versions.get_mut(id) {
                version.is_latest = false;
            }
        }

        let version = TestVersion {
            id: TestVersionId::new(),
            test,
            version_number: next_number,
            is_latest: true,
        };
        self.versions_by_test.entry(test).or_default().push(version.id);
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }

    /// Attach a rule to its version
    ///
    /// # Errors
    /// Fails when the version is not registered.
    pub fn add_rule(&self, rule: Rule) -> Result<RuleId, RegistryError> {
        if !self.versions.contains_key(&rule.version) {
            return Err(RegistryError::UnknownVersion(rule.version));
        }
        let id = rule.id;
        self.rules_by_version.entry(rule.version).or_default().push(id);
        self.rules.insert(id, rule);
        Ok(id)
    }

    /// Attach a decision to its version
    ///
    /// # Errors
    /// Fails when the version or a referenced rule is unknown, or when a
    /// referenced rule belongs to a different version.
    pub fn add_decision(&self, decision: Decision) -> Result<DecisionId, RegistryError> {
        if !self.versions.contains_key(&decision.version) {
            return Err(RegistryError::UnknownVersion(decision.version));
        }
        let mut refs = vec![decision.kind.rule_a()];
        refs.extend(decision.kind.rule_b());
        for rule_id in refs {
            let rule = self.rules.get(&rule_id).ok_or(RegistryError::UnknownRule(rule_id))?;
            if rule.version != decision.version {
                return Err(RegistryError::CrossVersionDecision);
            }
        }
        let id = decision.id;
        self.decisions_by_version.entry(decision.version).or_default().push(id);
        self.decisions.insert(id, decision);
        Ok(id)
    }

    // ---- lookups ----------------------------------------------------------

    /// Equivalence group by id
    #[must_use]
    pub fn get_group(&self, id: EquivalenceGroupId) -> Option<TestEquivalenceGroup> {
        self.groups.get(&id).map(|g| g.clone())
    }

    /// Test by id
    #[must_use]
    pub fn get_test(&self, id: TestId) -> Option<QualityTest> {
        self.tests.get(&id).map(|t| t.clone())
    }

    /// Version by id
    #[must_use]
    pub fn get_version(&self, id: TestVersionId) -> Option<TestVersion> {
        self.versions.get(&id).map(|v| v.clone())
    }

    /// Rule by id
    #[must_use]
    pub fn get_rule(&self, id: RuleId) -> Option<Rule> {
        self.rules.get(&id).map(|r| r.clone())
    }

    /// Decision by id
    #[must_use]
    pub fn get_decision(&self, id: DecisionId) -> Option<Decision> {
        self.decisions.get(&id).map(|d| d.clone())
    }

    /// Equivalence group by display name
    ///
    /// # Errors
    /// Fails when the name is unknown or names more than one group.
    pub fn group_by_name(&self, name: &str) -> Result<TestEquivalenceGroup, RegistryError> {
        let mut matches: Vec<TestEquivalenceGroup> = self
            .groups
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone())
            .collect();
        match matches.len() {
            0 => Err(RegistryError::NoSuchName(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(RegistryError::AmbiguousName(name.to_string())),
        }
    }

    /// Highest-numbered version of a test
    ///
    /// # Errors
    /// Fails when the test is unknown or has no published versions.
    pub fn latest_version(&self, test: TestId) -> Result<TestVersion, RegistryError> {
        if !self.tests.contains_key(&test) {
            return Err(RegistryError::UnknownTest(test));
        }
        self.versions_by_test
            .get(&test)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.get_version(id))
            .max_by_key(|v| v.version_number)
            .ok_or(RegistryError::NoVersions(test))
    }

    /// Rules attached to a version, in registration order
    #[must_use]
    pub fn rules_for(&self, version: TestVersionId) -> Vec<Rule> {
        self.rules_by_version
            .get(&version)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.get_rule(id))
            .collect()
    }

    /// Decisions attached to a version, in registration order
    #[must_use]
    pub fn decisions_for(&self, version: TestVersionId) -> Vec<Decision> {
        self.decisions_by_version
            .get(&version)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.get_decision(id))
            .collect()
    }
}
