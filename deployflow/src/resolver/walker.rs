//! Activity tree walker.
//!
//! Visits every activity reachable from a pipeline's top-level list in
//! document order: the activity itself first, then each of its child lists
//! in declaration order.

use crate::core::{Activity, ActivityPath};
use tracing::trace;

/// Receives each activity the walker reaches.
pub trait ActivityVisitor {
    /// Called exactly once per activity.
    ///
    /// `path` holds the containers above `activity`, outermost first.
    fn visit(&mut self, pipeline: &str, activity: &Activity, path: &ActivityPath);
}

/// Walks `activities` and everything nested below them.
///
/// The walker keeps no state of its own; each descent gets a fresh path
/// derived from its parent's, so branches never see each other's segments.
pub fn walk_activities<V>(pipeline: &str, activities: &[Activity], path: &ActivityPath, visitor: &mut V)
where
    V: ActivityVisitor + ?Sized,
{
    for activity in activities {
        visitor.visit(pipeline, activity, path);

        let branches = activity.branches();
        if branches.is_empty() {
            continue;
        }

        let nested = path.child(activity.name());
        for branch in branches {
            trace!(
                pipeline,
                container = activity.name(),
                branch = branch.label,
                count = branch.activities.len(),
                "Descending into branch"
            );
            walk_activities(pipeline, branch.activities, &nested, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SwitchCase;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingVisitor {
        visited: Vec<String>,
    }

    impl ActivityVisitor for RecordingVisitor {
        fn visit(&mut self, pipeline: &str, activity: &Activity, path: &ActivityPath) {
            self.visited.push(format!("{pipeline}: {}", path.describe(activity.name())));
        }
    }

    fn walk(activities: &[Activity]) -> Vec<String> {
        let mut visitor = RecordingVisitor::default();
        walk_activities("P", activities, &ActivityPath::root(), &mut visitor);
        visitor.visited
    }

    #[test]
    fn test_empty_pipeline_is_noop() {
        assert!(walk(&[]).is_empty());
    }

    #[test]
    fn test_document_order_with_nesting() {
        let activities = vec![
            Activity::other("First", "Wait"),
            Activity::if_condition(
                "Check",
                vec![Activity::other("Yes", "Wait")],
                vec![Activity::for_each("Loop", vec![Activity::other("Body", "Copy")])],
            ),
            Activity::other("Last", "Wait"),
        ];

        assert_eq!(
            walk(&activities),
            vec![
                "P: First",
                "P: Check",
                "P: Check → Yes",
                "P: Check → Loop",
                "P: Check → Loop → Body",
                "P: Last",
            ]
        );
    }

    #[test]
    fn test_switch_cases_then_default() {
        let activities = vec![Activity::switch(
            "Route",
            vec![
                SwitchCase::new("a", vec![Activity::other("A", "Wait")]),
                SwitchCase::new("b", vec![Activity::other("B", "Wait")]),
            ],
            vec![Activity::other("D", "Wait")],
        )];

        assert_eq!(
            walk(&activities),
            vec!["P: Route", "P: Route → A", "P: Route → B", "P: Route → D"]
        );
    }

    #[test]
    fn test_sibling_paths_do_not_leak() {
        let activities = vec![
            Activity::until("Outer", vec![Activity::until("Inner", vec![])]),
            Activity::other("After", "Wait"),
        ];

        assert_eq!(walk(&activities), vec!["P: Outer", "P: Outer → Inner", "P: After"]);
    }

    #[test]
    fn test_each_activity_visited_once() {
        let activities = vec![Activity::for_each(
            "Loop",
            vec![
                Activity::execute_pipeline("Run", "Child"),
                Activity::until("Retry", vec![Activity::execute_pipeline("Run", "Child")]),
            ],
        )];

        let total: usize = activities.iter().map(Activity::total_count).sum();
        assert_eq!(walk(&activities).len(), total);
    }
}
