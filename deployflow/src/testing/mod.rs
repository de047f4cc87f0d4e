//! Testing utilities for pipeline batches.
//!
//! This module provides:
//! - Terse builders for activity trees and pipelines
//! - Assertions over deployment orders

pub mod assertions;
pub mod fixtures;

pub use assertions::{assert_deploys_before, assert_level, assert_unresolved};
pub use fixtures::{
    execute_pipeline, for_each, if_condition, other, pipeline, switch, until, PipelineChain,
};
