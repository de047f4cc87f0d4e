//! Resolver configuration.

use crate::errors::DeployflowError;
use serde::{Deserialize, Serialize};

/// How pipelines with the same level are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lexicographic by pipeline name.
    #[default]
    Name,
    /// Order in which pipelines appear in the input batch.
    Discovery,
}

/// Configuration for a [`DependencyResolver`](crate::resolver::DependencyResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Tie-break within a level.
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Fail ordering when a reference targets a pipeline outside the batch.
    #[serde(default)]
    pub strict_references: bool,
    /// Level at which diagnostics are logged (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            strict_references: false,
            log_level: default_log_level(),
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this type.
    pub fn from_json_str(json: &str) -> Result<Self, DeployflowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the tie-break rule.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Enables or disables strict reference checking.
    #[must_use]
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    /// Sets the diagnostic log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
