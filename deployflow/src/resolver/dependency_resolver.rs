//! Resolution facade used by deployment drivers.

use super::{ReferenceStore, ReferencedFlags};
use crate::config::ResolverConfig;
use crate::core::{PipelineComponent, PipelineReference};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LoggingDiagnosticSink};
use crate::errors::{DeployflowError, UnresolvedReferencesError};
use crate::ordering::{DeploymentOrder, DeploymentOrderCalculator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info_span;
use uuid::Uuid;

/// Everything one resolution pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// Identifier correlating this pass in logs.
    pub run_id: Uuid,
    /// When the pass finished.
    pub resolved_at: DateTime<Utc>,
    /// Every edge in discovery order.
    pub references: Vec<PipelineReference>,
    /// Per-pipeline reference flags.
    pub referenced_flags: ReferencedFlags,
    /// Recoverable problems found along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// The deployment order.
    pub order: DeploymentOrder,
}

/// Resolves pipeline references and deployment order for one batch at a time.
///
/// Each resolver owns its store. Resolve independent batches concurrently by
/// giving each its own resolver.
#[derive(Debug)]
pub struct DependencyResolver {
    config: ResolverConfig,
    store: ReferenceStore,
    calculator: DeploymentOrderCalculator,
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl DependencyResolver {
    /// Creates a resolver that logs diagnostics at the configured level.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let sink = Arc::new(LoggingDiagnosticSink::from_level_name(&config.log_level));
        Self::with_sink(config, sink)
    }

    /// Creates a resolver reporting diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(config: ResolverConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let calculator = DeploymentOrderCalculator::new().with_tie_break(config.tie_break);
        Self {
            config,
            store: ReferenceStore::with_sink(sink),
            calculator,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Walks a batch of components, replacing any previous results.
    pub fn parse_all(&mut self, components: &[PipelineComponent]) {
        self.store.parse_all(components);
    }

    /// Ingests a batch of raw pipeline definitions, replacing any previous results.
    ///
    /// # Errors
    ///
    /// Returns an error if a definition has no usable name.
    pub fn parse_definitions(&mut self, definitions: &[serde_json::Value]) -> Result<(), DeployflowError> {
        Ok(self.store.parse_definitions(definitions)?)
    }

    /// Returns the references found by the last parse.
    #[must_use]
    pub fn get_pipeline_references(&self) -> &[PipelineReference] {
        self.store.references()
    }

    /// Computes the deployment order for the last parsed batch.
    ///
    /// # Errors
    ///
    /// Returns [`DeployflowError::CycleDetected`] if pipelines invoke each
    /// other in a loop. With strict references enabled, returns
    /// [`DeployflowError::UnresolvedReferences`] when some target is outside
    /// the batch; cycles are reported first.
    pub fn calculate_deployment_order(&self) -> Result<DeploymentOrder, DeployflowError> {
        let order = self
            .calculator
            .calculate(self.store.pipeline_names(), self.store.references())?;

        if self.config.strict_references && !order.is_fully_resolved() {
            let targets = order
                .unresolved()
                .iter()
                .map(|u| u.target_pipeline_name.clone())
                .collect();
            return Err(UnresolvedReferencesError::new(targets).into());
        }
        Ok(order)
    }

    /// Parses `components` and orders them in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::calculate_deployment_order`].
    pub fn resolve(&mut self, components: &[PipelineComponent]) -> Result<ResolutionReport, DeployflowError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("resolve", %run_id, pipelines = components.len());
        let _guard = span.enter();

        self.parse_all(components);
        let order = self.calculate_deployment_order()?;

        Ok(ResolutionReport {
            run_id,
            resolved_at: Utc::now(),
            references: self.store.references().to_vec(),
            referenced_flags: self.store.referenced_flags().clone(),
            diagnostics: self.store.diagnostics().to_vec(),
            order,
        })
    }
}
