//! Assertions over deployment orders.

use crate::ordering::DeploymentOrder;

/// Asserts that `first` is deployed strictly before `second`.
///
/// # Panics
///
/// Panics if either pipeline is missing or the order is wrong.
pub fn assert_deploys_before(order: &DeploymentOrder, first: &str, second: &str) {
    let names = order.pipeline_names();
    let Some(a) = names.iter().position(|n| *n == first) else {
        panic!("'{first}' is not in the deployment order {names:?}");
    };
    let Some(b) = names.iter().position(|n| *n == second) else {
        panic!("'{second}' is not in the deployment order {names:?}");
    };
    assert!(a < b, "expected '{first}' before '{second}' in {names:?}");
}

/// Asserts the level of a pipeline.
///
/// # Panics
///
/// Panics if the pipeline is missing or has another level.
pub fn assert_level(order: &DeploymentOrder, pipeline: &str, level: usize) {
    match order.level_of(pipeline) {
        Some(actual) => assert_eq!(actual, level, "level of '{pipeline}'"),
        None => panic!("'{pipeline}' is not in the deployment order"),
    }
}

/// Asserts that `target` is reported as unresolved.
///
/// # Panics
///
/// Panics if `target` is not among the unresolved references.
pub fn assert_unresolved(order: &DeploymentOrder, target: &str) {
    assert!(
        order.unresolved().iter().any(|u| u.target_pipeline_name == target),
        "expected '{target}' to be unresolved, got {:?}",
        order.unresolved()
    );
}
