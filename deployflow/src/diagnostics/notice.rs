//! Diagnostic records.

use crate::core::ActivityPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of recoverable problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// An activity lacks fields required by its declared type and was skipped.
    MalformedActivity,
    /// An `ExecutePipeline` activity names no target pipeline.
    MissingInvokeTarget,
    /// A pipeline name appeared more than once in a batch; later copies were ignored.
    DuplicatePipeline,
    /// A reference targets a pipeline absent from the batch.
    DanglingReference,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedActivity => write!(f, "malformed_activity"),
            Self::MissingInvokeTarget => write!(f, "missing_invoke_target"),
            Self::DuplicatePipeline => write!(f, "duplicate_pipeline"),
            Self::DanglingReference => write!(f, "dangling_reference"),
        }
    }
}

/// A single diagnostic notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The problem kind.
    pub code: DiagnosticCode,
    /// Pipeline the problem was found in.
    pub pipeline: String,
    /// Activity involved, when there is one.
    pub activity: Option<String>,
    /// Containers traversed to reach the activity.
    #[serde(default)]
    pub path: ActivityPath,
    /// Human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new pipeline-level diagnostic.
    #[must_use]
    pub fn new(code: DiagnosticCode, pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            pipeline: pipeline.into(),
            activity: None,
            path: ActivityPath::root(),
            message: message.into(),
        }
    }

    /// Attaches the activity and its path.
    #[must_use]
    pub fn at(mut self, activity: impl Into<String>, path: ActivityPath) -> Self {
        self.activity = Some(activity.into());
        self.path = path;
        self
    }

    /// Human-readable location, `pipeline: outer → activity`.
    #[must_use]
    pub fn location(&self) -> String {
        match self.activity {
            Some(ref activity) => format!("{}: {}", self.pipeline, self.path.describe(activity)),
            None => self.pipeline.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.location(), self.message)
    }
}
