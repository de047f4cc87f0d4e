//! Reference store.
//!
//! Owns every dependency edge found in one deployment batch. A store is
//! reset at the start of each [`ReferenceStore::parse_all`] call and is not
//! meant to be shared between concurrent resolution passes; give each batch
//! its own store.

use super::extractor::{extract_reference, Extraction};
use super::walker::{walk_activities, ActivityVisitor};
use crate::core::{Activity, ActivityPath, PipelineComponent, PipelineReference};
use crate::definition;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, LoggingDiagnosticSink};
use crate::errors::DefinitionError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Reference status of one pipeline name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceFlag {
    /// The pipeline name.
    pub pipeline_name: String,
    /// True iff at least one reference targets this pipeline.
    pub is_referenced_by_others: bool,
    /// True if the pipeline is referenced but not part of the batch.
    pub unresolved: bool,
    /// Distinct parents referencing this pipeline, in discovery order.
    pub referenced_by: Vec<String>,
}

/// Per-pipeline reference flags, known pipelines first, then dangling targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferencedFlags {
    entries: Vec<ReferenceFlag>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ReferencedFlags {
    /// Returns the flag for a pipeline.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceFlag> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Returns true if some reference targets `name`.
    #[must_use]
    pub fn is_referenced(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.is_referenced_by_others)
    }

    /// Returns all flags in order.
    #[must_use]
    pub fn entries(&self) -> &[ReferenceFlag] {
        &self.entries
    }

    /// Returns the flags of referenced pipelines that are not in the batch.
    pub fn unresolved(&self) -> impl Iterator<Item = &ReferenceFlag> {
        self.entries.iter().filter(|f| f.unresolved)
    }

    /// Returns the number of tracked pipeline names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, name: &str, unresolved: bool) -> &mut ReferenceFlag {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.entries.push(ReferenceFlag {
                    pipeline_name: name.to_string(),
                    is_referenced_by_others: false,
                    unresolved,
                    referenced_by: Vec::new(),
                });
                self.index.insert(name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i]
    }
}

/// Accumulates dependency edges for one batch.
pub struct ReferenceStore {
    references: Vec<PipelineReference>,
    pipeline_names: Vec<String>,
    flags: ReferencedFlags,
    diagnostics: Vec<Diagnostic>,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ReferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceStore")
            .field("references", &self.references.len())
            .field("pipeline_names", &self.pipeline_names)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceStore {
    /// Creates a store that logs diagnostics at `WARN`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LoggingDiagnosticSink::default()))
    }

    /// Creates a store that reports diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            references: Vec::new(),
            pipeline_names: Vec::new(),
            flags: ReferencedFlags::default(),
            diagnostics: Vec::new(),
            sink,
        }
    }

    /// Walks every component and records its references.
    ///
    /// Previous results are discarded first, so calling this twice with the
    /// same input yields the same state. Duplicate pipeline names keep the
    /// first definition.
    pub fn parse_all(&mut self, components: &[PipelineComponent]) {
        self.reset();
        self.collect(components.iter().map(|c| (c.name.as_str(), c.activities.as_slice())));
    }

    /// Ingests raw pipeline JSON and records its references.
    ///
    /// Malformed activities are skipped with a diagnostic.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the store empty, if any definition has no
    /// usable name.
    pub fn parse_definitions(&mut self, definitions: &[serde_json::Value]) -> Result<(), DefinitionError> {
        self.reset();
        let parsed = definitions
            .iter()
            .map(definition::parse_pipeline)
            .collect::<Result<Vec<_>, _>>()?;

        for d in parsed.iter().flat_map(|p| &p.diagnostics) {
            self.report(d.clone());
        }
        self.collect(
            parsed
                .iter()
                .map(|p| (p.component.name.as_str(), p.component.activities.as_slice())),
        );
        Ok(())
    }

    /// Returns every edge in discovery order.
    #[must_use]
    pub fn references(&self) -> &[PipelineReference] {
        &self.references
    }

    /// Returns the edges whose target is `target`.
    pub fn references_to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a PipelineReference> {
        self.references
            .iter()
            .filter(move |r| r.target_pipeline_name == target)
    }

    /// Returns the edges whose parent is `parent`.
    pub fn references_from<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a PipelineReference> {
        self.references
            .iter()
            .filter(move |r| r.parent_pipeline_name == parent)
    }

    /// Returns the distinct pipeline names of the batch in input order.
    #[must_use]
    pub fn pipeline_names(&self) -> &[String] {
        &self.pipeline_names
    }

    /// Returns the diagnostics of the last pass.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the flags computed by the last [`Self::update_referenced_flags`].
    #[must_use]
    pub fn referenced_flags(&self) -> &ReferencedFlags {
        &self.flags
    }

    /// Recomputes which pipelines are referenced.
    ///
    /// Every known pipeline gets a flag. Targets outside the batch are added
    /// after them and marked unresolved.
    pub fn update_referenced_flags(&mut self) -> &ReferencedFlags {
        let mut flags = ReferencedFlags::default();
        for name in &self.pipeline_names {
            flags.entry(name, false);
        }
        for reference in &self.references {
            let flag = flags.entry(&reference.target_pipeline_name, true);
            flag.is_referenced_by_others = true;
            if !flag.referenced_by.contains(&reference.parent_pipeline_name) {
                flag.referenced_by.push(reference.parent_pipeline_name.clone());
            }
        }
        self.flags = flags;
        &self.flags
    }

    fn reset(&mut self) {
        self.references.clear();
        self.pipeline_names.clear();
        self.flags = ReferencedFlags::default();
        self.diagnostics.clear();
    }

    fn collect<'a>(&mut self, components: impl Iterator<Item = (&'a str, &'a [Activity])>) {
        let mut seen = HashSet::new();
        for (name, activities) in components {
            if !seen.insert(name) {
                self.report(Diagnostic::new(
                    DiagnosticCode::DuplicatePipeline,
                    name,
                    "pipeline appears more than once in the batch; keeping the first definition",
                ));
                continue;
            }
            self.pipeline_names.push(name.to_string());

            let mut collector = ReferenceCollector::default();
            walk_activities(name, activities, &ActivityPath::root(), &mut collector);
            self.references.extend(collector.references);
            for d in collector.diagnostics {
                self.report(d);
            }
        }

        self.update_referenced_flags();
        let dangling: Vec<Diagnostic> = self
            .flags
            .unresolved()
            .map(|flag| {
                Diagnostic::new(
                    DiagnosticCode::DanglingReference,
                    flag.referenced_by.join(", "),
                    format!(
                        "references pipeline '{}' which is not part of the batch",
                        flag.pipeline_name
                    ),
                )
            })
            .collect();
        for d in dangling {
            self.report(d);
        }

        info!(
            pipelines = self.pipeline_names.len(),
            references = self.references.len(),
            diagnostics = self.diagnostics.len(),
            "Collected pipeline references"
        );
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.emit(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

#[derive(Default)]
struct ReferenceCollector {
    references: Vec<PipelineReference>,
    diagnostics: Vec<Diagnostic>,
}

impl ActivityVisitor for ReferenceCollector {
    fn visit(&mut self, pipeline: &str, activity: &Activity, path: &ActivityPath) {
        match extract_reference(pipeline, activity, path) {
            Extraction::NotApplicable => {}
            Extraction::Reference(reference) => {
                debug!(
                    parent = %reference.parent_pipeline_name,
                    target = %reference.target_pipeline_name,
                    location = %reference.location(),
                    "Found pipeline reference"
                );
                self.references.push(reference);
            }
            Extraction::MissingTarget(diagnostic) => self.diagnostics.push(diagnostic),
        }
    }
}
