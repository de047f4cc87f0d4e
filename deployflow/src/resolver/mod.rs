//! Pipeline reference resolution.
//!
//! This module provides:
//! - The activity tree walker
//! - The reference extractor
//! - The reference store accumulating edges for a batch
//! - [`DependencyResolver`], tying the store to the order calculator

mod dependency_resolver;
mod extractor;
mod store;
mod walker;

pub use dependency_resolver::{DependencyResolver, ResolutionReport};
pub use extractor::{extract_reference, Extraction};
pub use store::{ReferenceFlag, ReferenceStore, ReferencedFlags};
pub use walker::{walk_activities, ActivityVisitor};
