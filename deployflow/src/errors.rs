//! Error types for deployflow.
//!
//! Only deployment ordering produces hard failures. Problems found while
//! walking activity trees are contained and surfaced as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The main error type for deployflow operations.
#[derive(Debug, Error)]
pub enum DeployflowError {
    /// Pipelines depend on each other in a loop; no deployment order exists.
    #[error("{0}")]
    CycleDetected(#[from] CycleDetectedError),

    /// A pipeline definition could not be ingested.
    #[error("{0}")]
    Definition(#[from] DefinitionError),

    /// Strict mode rejected references to pipelines outside the batch.
    #[error("{0}")]
    UnresolvedReferences(#[from] UnresolvedReferencesError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DeployflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Structured metadata attached to an error for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "RESOLVE-001-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: BTreeMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when the pipeline dependency graph contains a cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cycle detected between pipelines: {}", cycle_path.join(" -> "))]
pub struct CycleDetectedError {
    /// Pipelines that sit on at least one dependency cycle, sorted by name.
    pub pipelines: Vec<String>,
    /// Pipelines that could not be ordered only because they depend on a cycle.
    pub blocked: Vec<String>,
    /// One concrete loop, first element repeated at the end (`a -> b -> a`).
    pub cycle_path: Vec<String>,
    /// Error info.
    pub error_info: ErrorInfo,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(pipelines: Vec<String>, blocked: Vec<String>, cycle_path: Vec<String>) -> Self {
        let info = ErrorInfo::new(
            codes::CYCLE,
            format!(
                "Pipelines invoke each other in a loop: {}",
                cycle_path.join(" -> ")
            ),
        )
        .with_fix_hint("Remove one of the ExecutePipeline activities in the cycle to break it.")
        .with_context_entry("pipelines", pipelines.join(", "));

        Self {
            pipelines,
            blocked,
            cycle_path,
            error_info: info,
        }
    }

    /// Returns true if `name` participates in a cycle.
    #[must_use]
    pub fn involves(&self, name: &str) -> bool {
        self.pipelines.iter().any(|p| p == name)
    }
}

/// Errors raised while ingesting a pipeline definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The document is not valid JSON.
    #[error("Invalid pipeline JSON: {0}")]
    InvalidJson(String),

    /// The definition is not a JSON object.
    #[error("Pipeline definition must be a JSON object")]
    NotAnObject,

    /// The definition has no usable name.
    #[error("Pipeline definition has no name")]
    MissingName,
}

impl DefinitionError {
    /// Returns the error info for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new(codes::DEFINITION, self.to_string())
            .with_fix_hint("Every pipeline needs a non-empty \"name\" field.")
    }
}

/// Error raised in strict mode when references point outside the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unresolved pipeline references: {}", targets.join(", "))]
pub struct UnresolvedReferencesError {
    /// Target pipelines that are not part of the batch, sorted by name.
    pub targets: Vec<String>,
    /// Error info.
    pub error_info: ErrorInfo,
}

impl UnresolvedReferencesError {
    /// Creates a new unresolved references error.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        let info = ErrorInfo::new(
            codes::UNRESOLVED,
            format!("{} referenced pipeline(s) are missing from the batch", targets.len()),
        )
        .with_fix_hint("Include the referenced pipelines in the batch or disable strict references.");

        Self {
            targets,
            error_info: info,
        }
    }
}

/// Error codes used in [`ErrorInfo`].
pub mod codes {
    /// Dependency cycle.
    pub const CYCLE: &str = "RESOLVE-001-CYCLE";
    /// Unusable pipeline definition.
    pub const DEFINITION: &str = "RESOLVE-002-DEFINITION";
    /// Reference to a pipeline outside the batch.
    pub const UNRESOLVED: &str = "RESOLVE-003-UNRESOLVED";
}

/// Provides default suggestions for error codes.
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            codes::CYCLE => Some(
                "Check ExecutePipeline activities for pipelines that invoke each other, \
                 including through ForEach, IfCondition, Switch and Until containers.",
            ),
            codes::DEFINITION => Some(
                "Export the pipeline definition again and make sure it carries its name.",
            ),
            codes::UNRESOLVED => Some(
                "Deploy the referenced pipelines first or add them to this batch.",
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_creation() {
        let info = ErrorInfo::new("TEST-001", "Test error")
            .with_fix_hint("Fix this by doing that")
            .with_context_entry("pipeline", "Parent");

        assert_eq!(info.code, "TEST-001");
        assert_eq!(info.fix_hint, Some("Fix this by doing that".to_string()));
        assert_eq!(info.context.get("pipeline"), Some(&"Parent".to_string()));
    }

    #[test]
    fn test_cycle_detected_error() {
        let err = CycleDetectedError::new(
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
            vec!["a".to_string(), "b".to_string(), "a".to_string()],
        );

        assert!(err.to_string().contains("a -> b -> a"));
        assert_eq!(err.error_info.code, codes::CYCLE);
        assert!(err.involves("a"));
        assert!(!err.involves("c"));
    }

    #[test]
    fn test_unresolved_error_is_distinct_from_cycle() {
        let err: DeployflowError =
            UnresolvedReferencesError::new(vec!["Missing".to_string()]).into();

        assert!(matches!(err, DeployflowError::UnresolvedReferences(_)));
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_definition_error_info() {
        let info = DefinitionError::MissingName.error_info();
        assert_eq!(info.code, codes::DEFINITION);
    }

    #[test]
    fn test_error_suggestions() {
        assert!(ErrorSuggestions::get(codes::CYCLE).is_some());
        assert!(ErrorSuggestions::get("UNKNOWN").is_none());
    }
}
