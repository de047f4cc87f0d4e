//! Core domain model types for deployflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The activity tree and its kinds
//! - Pipeline components
//! - Dependency edges and activity paths

mod activity;
mod component;
mod reference;

pub use activity::{Activity, ActivityKind, Branch, SwitchCase};
pub use component::PipelineComponent;
pub use reference::{ActivityPath, PipelineReference};
