//! # Deployflow
//!
//! Resolves invoke-pipeline references across a batch of data-factory pipeline
//! definitions and computes a deployment order in which every pipeline is
//! deployed after the pipelines it invokes.
//!
//! Deployflow provides:
//!
//! - **Activity tree walking**: Visits invoke activities nested at any depth inside
//!   ForEach, IfCondition, Switch and Until containers
//! - **Reference collection**: A per-batch store of parent-to-child references and
//!   referenced flags
//! - **Deployment ordering**: Level assignment with cycle detection and
//!   deterministic tie-breaking
//! - **Diagnostics**: Malformed activities and dangling references are reported
//!   through a pluggable sink instead of failing the batch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deployflow::prelude::*;
//!
//! let mut resolver = DependencyResolver::new(ResolverConfig::default());
//! resolver.parse_definitions(&definitions)?;
//!
//! for entry in resolver.calculate_deployment_order()?.entries() {
//!     println!("{} (level {})", entry.pipeline_name, entry.level);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod definition;
pub mod diagnostics;
pub mod errors;
pub mod observability;
pub mod ordering;
pub mod resolver;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ResolverConfig, TieBreak};
    pub use crate::core::{
        Activity, ActivityKind, ActivityPath, PipelineComponent, PipelineReference, SwitchCase,
    };
    pub use crate::definition::{parse_pipeline, ParsedDefinition};
    pub use crate::diagnostics::{
        CollectingDiagnosticSink, Diagnostic, DiagnosticCode, DiagnosticSink,
        LoggingDiagnosticSink, NoOpDiagnosticSink,
    };
    pub use crate::errors::{
        CycleDetectedError, DefinitionError, DeployflowError, ErrorInfo,
        UnresolvedReferencesError,
    };
    pub use crate::ordering::{
        DeploymentOrder, DeploymentOrderCalculator, DeploymentOrderEntry, UnresolvedReference,
    };
    pub use crate::resolver::{
        DependencyResolver, ReferenceFlag, ReferenceStore, ReferencedFlags, ResolutionReport,
    };
}
