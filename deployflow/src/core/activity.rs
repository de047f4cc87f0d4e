//! Activity tree model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an activity, as named by the platform's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    /// Invokes another pipeline.
    ExecutePipeline,
    /// Iterates a body list over a collection.
    ForEach,
    /// Branches into `ifTrue` / `ifFalse` lists.
    IfCondition,
    /// Branches into one list per case plus a default list.
    Switch,
    /// Repeats a body list until a condition holds.
    Until,
    /// Any leaf activity that cannot create a dependency.
    Other,
}

impl ActivityKind {
    /// Maps a platform `type` string to a kind. Unknown types are [`Self::Other`].
    #[must_use]
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "ExecutePipeline" => Self::ExecutePipeline,
            "ForEach" => Self::ForEach,
            "IfCondition" => Self::IfCondition,
            "Switch" => Self::Switch,
            "Until" => Self::Until,
            _ => Self::Other,
        }
    }

    /// Returns true if activities of this kind hold nested activity lists.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::ForEach | Self::IfCondition | Self::Switch | Self::Until)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutePipeline => write!(f, "ExecutePipeline"),
            Self::ForEach => write!(f, "ForEach"),
            Self::IfCondition => write!(f, "IfCondition"),
            Self::Switch => write!(f, "Switch"),
            Self::Until => write!(f, "Until"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// One case of a [`Activity::Switch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// The case value.
    pub value: String,
    /// Activities run when the case matches.
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl SwitchCase {
    /// Creates a new switch case.
    #[must_use]
    pub fn new(value: impl Into<String>, activities: Vec<Activity>) -> Self {
        Self {
            value: value.into(),
            activities,
        }
    }
}

/// A node in a pipeline's execution tree.
///
/// Container variants own their child lists, so a tree can never contain
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    /// Runs another pipeline by name.
    ExecutePipeline {
        /// Display name.
        name: String,
        /// Target pipeline. `None` when the definition omits it.
        pipeline: Option<String>,
        /// Whether the caller waits for the invoked pipeline to finish.
        wait_on_completion: bool,
    },
    /// Loop over a single body list.
    ForEach {
        /// Display name.
        name: String,
        /// Loop body.
        activities: Vec<Activity>,
    },
    /// Two-way branch.
    IfCondition {
        /// Display name.
        name: String,
        /// Activities run when the expression is true.
        if_true: Vec<Activity>,
        /// Activities run when the expression is false.
        if_false: Vec<Activity>,
    },
    /// Multi-way branch.
    Switch {
        /// Display name.
        name: String,
        /// Cases in declaration order.
        cases: Vec<SwitchCase>,
        /// Activities run when no case matches.
        default: Vec<Activity>,
    },
    /// Loop over a single body list until a condition holds.
    Until {
        /// Display name.
        name: String,
        /// Loop body.
        activities: Vec<Activity>,
    },
    /// Leaf activity of any other type.
    Other {
        /// Display name.
        name: String,
        /// The raw platform type, kept for diagnostics.
        activity_type: String,
    },
}

/// A named child list exposed by a container activity.
#[derive(Debug, Clone, Copy)]
pub struct Branch<'a> {
    /// Branch label (`activities`, `ifTrue`, `ifFalse`, a case value, `default`).
    pub label: &'a str,
    /// The activities in the branch.
    pub activities: &'a [Activity],
}

impl Activity {
    /// Creates an invoke-pipeline activity that waits on completion.
    #[must_use]
    pub fn execute_pipeline(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::ExecutePipeline {
            name: name.into(),
            pipeline: Some(target.into()),
            wait_on_completion: true,
        }
    }

    /// Creates a ForEach container.
    #[must_use]
    pub fn for_each(name: impl Into<String>, activities: Vec<Self>) -> Self {
        Self::ForEach {
            name: name.into(),
            activities,
        }
    }

    /// Creates an IfCondition container.
    #[must_use]
    pub fn if_condition(name: impl Into<String>, if_true: Vec<Self>, if_false: Vec<Self>) -> Self {
        Self::IfCondition {
            name: name.into(),
            if_true,
            if_false,
        }
    }

    /// Creates a Switch container.
    #[must_use]
    pub fn switch(name: impl Into<String>, cases: Vec<SwitchCase>, default: Vec<Self>) -> Self {
        Self::Switch {
            name: name.into(),
            cases,
            default,
        }
    }

    /// Creates an Until container.
    #[must_use]
    pub fn until(name: impl Into<String>, activities: Vec<Self>) -> Self {
        Self::Until {
            name: name.into(),
            activities,
        }
    }

    /// Creates a leaf activity of an arbitrary type.
    #[must_use]
    pub fn other(name: impl Into<String>, activity_type: impl Into<String>) -> Self {
        Self::Other {
            name: name.into(),
            activity_type: activity_type.into(),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ExecutePipeline { name, .. }
            | Self::ForEach { name, .. }
            | Self::IfCondition { name, .. }
            | Self::Switch { name, .. }
            | Self::Until { name, .. }
            | Self::Other { name, .. } => name,
        }
    }

    /// Returns the activity kind.
    #[must_use]
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::ExecutePipeline { .. } => ActivityKind::ExecutePipeline,
            Self::ForEach { .. } => ActivityKind::ForEach,
            Self::IfCondition { .. } => ActivityKind::IfCondition,
            Self::Switch { .. } => ActivityKind::Switch,
            Self::Until { .. } => ActivityKind::Until,
            Self::Other { .. } => ActivityKind::Other,
        }
    }

    /// Returns every child list in declaration order. Leaves return none.
    #[must_use]
    pub fn branches(&self) -> Vec<Branch<'_>> {
        match self {
            Self::ForEach { activities, .. } | Self::Until { activities, .. } => vec![Branch {
                label: "activities",
                activities,
            }],
            Self::IfCondition {
                if_true, if_false, ..
            } => vec![
                Branch {
                    label: "ifTrue",
                    activities: if_true,
                },
                Branch {
                    label: "ifFalse",
                    activities: if_false,
                },
            ],
            Self::Switch { cases, default, .. } => cases
                .iter()
                .map(|case| Branch {
                    label: &case.value,
                    activities: &case.activities,
                })
                .chain(std::iter::once(Branch {
                    label: "default",
                    activities: default,
                }))
                .collect(),
            Self::ExecutePipeline { .. } | Self::Other { .. } => Vec::new(),
        }
    }

    /// Counts this activity and every activity nested below it.
    #[must_use]
    pub fn total_count(&self) -> usize {
        1 + self
            .branches()
            .iter()
            .flat_map(|b| b.activities)
            .map(Self::total_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!(ActivityKind::from_type_name("ExecutePipeline"), ActivityKind::ExecutePipeline);
        assert_eq!(ActivityKind::from_type_name("Switch"), ActivityKind::Switch);
        assert_eq!(ActivityKind::from_type_name("Copy"), ActivityKind::Other);
        assert_eq!(ActivityKind::from_type_name("foreach"), ActivityKind::Other);
    }

    #[test]
    fn test_kind_is_container() {
        assert!(ActivityKind::ForEach.is_container());
        assert!(ActivityKind::Until.is_container());
        assert!(!ActivityKind::ExecutePipeline.is_container());
        assert!(!ActivityKind::Other.is_container());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ActivityKind::IfCondition.to_string(), "IfCondition");
        assert_eq!(ActivityKind::Other.to_string(), "Other");
    }

    #[test]
    fn test_if_condition_branch_order() {
        let activity = Activity::if_condition(
            "Check",
            vec![Activity::other("a", "Wait")],
            vec![Activity::other("b", "Wait")],
        );

        let labels: Vec<_> = activity.branches().iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["ifTrue", "ifFalse"]);
    }

    #[test]
    fn test_switch_branches_end_with_default() {
        let activity = Activity::switch(
            "Route",
            vec![SwitchCase::new("eu", vec![]), SwitchCase::new("us", vec![])],
            vec![],
        );

        let labels: Vec<_> = activity.branches().iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["eu", "us", "default"]);
    }

    #[test]
    fn test_leaves_have_no_branches() {
        assert!(Activity::execute_pipeline("Run", "Child").branches().is_empty());
        assert!(Activity::other("Copy", "Copy").branches().is_empty());
    }

    #[test]
    fn test_total_count() {
        let activity = Activity::for_each(
            "Loop",
            vec![Activity::until("Retry", vec![Activity::execute_pipeline("Run", "Child")])],
        );
        assert_eq!(activity.total_count(), 3);
    }

    #[test]
    fn test_activity_serialize_tagged() {
        let activity = Activity::execute_pipeline("Run", "Child");
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["kind"], "execute_pipeline");
        assert_eq!(json["pipeline"], "Child");
    }
}
