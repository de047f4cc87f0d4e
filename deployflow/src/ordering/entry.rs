//! Deployment order records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// One pipeline's place in the deployment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOrderEntry {
    /// The pipeline name.
    pub pipeline_name: String,
    /// Longest dependency chain below this pipeline; 0 means no dependencies.
    pub level: usize,
    /// Distinct pipelines this pipeline invokes directly.
    pub depends_on_pipelines: BTreeSet<String>,
    /// The subset of `depends_on_pipelines` that is not part of the batch.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unresolved_dependencies: BTreeSet<String>,
}

impl DeploymentOrderEntry {
    /// Returns true if some dependency lies outside the batch.
    #[must_use]
    pub fn has_unresolved_dependencies(&self) -> bool {
        !self.unresolved_dependencies.is_empty()
    }
}

/// A referenced pipeline that is not part of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    /// The missing pipeline.
    pub target_pipeline_name: String,
    /// Pipelines in the batch that invoke it, sorted by name.
    pub referenced_by: Vec<String>,
}

/// A computed deployment order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOrder {
    entries: Vec<DeploymentOrderEntry>,
    #[serde(default)]
    unresolved: Vec<UnresolvedReference>,
}

impl DeploymentOrder {
    pub(crate) fn new(entries: Vec<DeploymentOrderEntry>, unresolved: Vec<UnresolvedReference>) -> Self {
        Self { entries, unresolved }
    }

    /// Returns the entries, level ascending.
    #[must_use]
    pub fn entries(&self) -> &[DeploymentOrderEntry] {
        &self.entries
    }

    /// Consumes the order and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<DeploymentOrderEntry> {
        self.entries
    }

    /// Returns the pipeline names in deployment order.
    #[must_use]
    pub fn pipeline_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.pipeline_name.as_str()).collect()
    }

    /// Returns the entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DeploymentOrderEntry> {
        self.entries.iter().find(|e| e.pipeline_name == name)
    }

    /// Returns the level of `name`.
    #[must_use]
    pub fn level_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|e| e.level)
    }

    /// Groups pipeline names by level. Pipelines within a group do not
    /// depend on each other.
    #[must_use]
    pub fn levels(&self) -> Vec<Vec<&str>> {
        let mut levels: Vec<Vec<&str>> = Vec::new();
        for entry in &self.entries {
            if levels.len() <= entry.level {
                levels.resize_with(entry.level + 1, Vec::new);
            }
            levels[entry.level].push(&entry.pipeline_name);
        }
        levels
    }

    /// Returns referenced pipelines that are not part of the batch.
    #[must_use]
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Returns true if every reference resolved inside the batch.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest of the ordered `(name, level)` pairs.
    ///
    /// Equal orders always produce equal fingerprints, so a driver can tell
    /// whether a plan changed between runs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.pipeline_name.as_bytes());
            hasher.update([0u8]);
            hasher.update(entry.level.to_le_bytes());
        }
        hex::encode(&hasher.finalize()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, level: usize) -> DeploymentOrderEntry {
        DeploymentOrderEntry {
            pipeline_name: name.to_string(),
            level,
            depends_on_pipelines: BTreeSet::new(),
            unresolved_dependencies: BTreeSet::new(),
        }
    }

    #[test]
    fn test_levels_grouping() {
        let order = DeploymentOrder::new(
            vec![entry("a", 0), entry("b", 0), entry("c", 1), entry("d", 2)],
            vec![],
        );

        assert_eq!(order.levels(), vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
        assert_eq!(order.level_of("c"), Some(1));
        assert_eq!(order.level_of("z"), None);
        assert!(order.is_fully_resolved());
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let a = DeploymentOrder::new(vec![entry("a", 0), entry("b", 1)], vec![]);
        let b = DeploymentOrder::new(vec![entry("a", 0), entry("b", 1)], vec![]);
        let c = DeploymentOrder::new(vec![entry("b", 0), entry("a", 1)], vec![]);

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 32);
    }

    #[test]
    fn test_empty_order() {
        let order = DeploymentOrder::default();
        assert!(order.is_empty());
        assert!(order.levels().is_empty());
    }

    #[test]
    fn test_entry_serialization_omits_empty_unresolved() {
        let json = serde_json::to_value(entry("a", 0)).unwrap();
        assert!(json.get("unresolved_dependencies").is_none());
        assert_eq!(json["depends_on_pipelines"], serde_json::json!([]));
    }
}
