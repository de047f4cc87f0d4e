//! Dependency edges between pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Container names traversed to reach an activity.
///
/// Paths are never mutated in place: [`ActivityPath::child`] returns a new
/// path, so sibling branches each get their own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityPath(Vec<String>);

impl ActivityPath {
    /// Creates an empty (top-level) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `container` appended.
    #[must_use]
    pub fn child(&self, container: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(container.into());
        Self(segments)
    }

    /// Returns the container names, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the nesting depth (0 for top-level activities).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Renders the path down to `activity`, e.g. `ForEachLoop → ExecuteChild`.
    #[must_use]
    pub fn describe(&self, activity: &str) -> String {
        self.0
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(activity))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

impl fmt::Display for ActivityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" → "))
    }
}

impl<S: Into<String>> FromIterator<S> for ActivityPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// An `ExecutePipeline` edge from the pipeline containing the activity to
/// the pipeline it invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReference {
    /// Pipeline containing the invoking activity.
    pub parent_pipeline_name: String,
    /// Pipeline being invoked.
    pub target_pipeline_name: String,
    /// Display name of the invoking activity.
    pub activity_name: String,
    /// Containers traversed to reach the activity.
    pub path: ActivityPath,
    /// Whether the parent waits for the target to finish.
    pub wait_on_completion: bool,
}

impl PipelineReference {
    /// Creates a new reference for a top-level activity that waits on completion.
    #[must_use]
    pub fn new(
        parent: impl Into<String>,
        target: impl Into<String>,
        activity: impl Into<String>,
    ) -> Self {
        Self {
            parent_pipeline_name: parent.into(),
            target_pipeline_name: target.into(),
            activity_name: activity.into(),
            path: ActivityPath::root(),
            wait_on_completion: true,
        }
    }

    /// Sets the path.
    #[must_use]
    pub fn with_path(mut self, path: ActivityPath) -> Self {
        self.path = path;
        self
    }

    /// Sets the wait flag.
    #[must_use]
    pub fn with_wait_on_completion(mut self, wait: bool) -> Self {
        self.wait_on_completion = wait;
        self
    }

    /// Returns true if the pipeline invokes itself.
    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.parent_pipeline_name == self.target_pipeline_name
    }

    /// Human-readable location of the invoking activity.
    #[must_use]
    pub fn location(&self) -> String {
        self.path.describe(&self.activity_name)
    }
}
