//! Pipeline components as ingested for one deployment batch.

use super::Activity;
use crate::definition::{self, ParsedDefinition};
use crate::errors::DefinitionError;
use serde::{Deserialize, Serialize};

/// One pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineComponent {
    /// Unique name within the batch.
    pub name: String,
    /// Top-level activities in document order.
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl PipelineComponent {
    /// Creates a new pipeline component.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>, activities: Vec<Activity>) -> Result<Self, DefinitionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DefinitionError::MissingName);
        }
        Ok(Self { name, activities })
    }

    /// Builds a component from the platform's pipeline JSON.
    ///
    /// Malformed activities are skipped and reported in the returned
    /// diagnostics.
    pub fn from_json(value: &serde_json::Value) -> Result<ParsedDefinition, DefinitionError> {
        definition::parse_pipeline(value)
    }

    /// Parses a JSON document and builds a component from it.
    pub fn from_json_str(json: &str) -> Result<ParsedDefinition, DefinitionError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| DefinitionError::InvalidJson(e.to_string()))?;
        definition::parse_pipeline(&value)
    }

    /// Counts every activity in the pipeline, nested ones included.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.activities.iter().map(Activity::total_count).sum()
    }
}
