//! Deployment ordering.
//!
//! Turns the reference set of a batch into an order in which every pipeline
//! comes after the pipelines it invokes.

mod calculator;
mod entry;

pub use calculator::DeploymentOrderCalculator;
pub use entry::{DeploymentOrder, DeploymentOrderEntry, UnresolvedReference};
