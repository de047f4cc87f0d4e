//! Builders for test batches.

use crate::core::{Activity, PipelineComponent, SwitchCase};

/// An invoke-pipeline activity.
#[must_use]
pub fn execute_pipeline(name: &str, target: &str) -> Activity {
    Activity::execute_pipeline(name, target)
}

/// A ForEach container.
#[must_use]
pub fn for_each(name: &str, activities: Vec<Activity>) -> Activity {
    Activity::for_each(name, activities)
}

/// An IfCondition container.
#[must_use]
pub fn if_condition(name: &str, if_true: Vec<Activity>, if_false: Vec<Activity>) -> Activity {
    Activity::if_condition(name, if_true, if_false)
}

/// A Switch container.
#[must_use]
pub fn switch(name: &str, cases: Vec<SwitchCase>, default: Vec<Activity>) -> Activity {
    Activity::switch(name, cases, default)
}

/// An Until container.
#[must_use]
pub fn until(name: &str, activities: Vec<Activity>) -> Activity {
    Activity::until(name, activities)
}

/// A leaf activity of the given platform type.
#[must_use]
pub fn other(name: &str, activity_type: &str) -> Activity {
    Activity::other(name, activity_type)
}

/// A pipeline component. Names are not validated.
#[must_use]
pub fn pipeline(name: &str, activities: Vec<Activity>) -> PipelineComponent {
    PipelineComponent {
        name: name.to_string(),
        activities,
    }
}

/// Generates batches of pipelines that invoke each other.
#[derive(Debug, Clone)]
pub struct PipelineChain {
    prefix: String,
}

impl PipelineChain {
    /// Creates a generator naming pipelines `{prefix}{index}`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn name(&self, index: usize) -> String {
        format!("{}{index:04}", self.prefix)
    }

    /// `len` pipelines where each invokes the next from inside a ForEach;
    /// the last invokes nothing. Returned in reverse dependency order.
    #[must_use]
    pub fn linear(&self, len: usize) -> Vec<PipelineComponent> {
        (0..len)
            .map(|i| {
                let activities = if i + 1 < len {
                    vec![for_each("Loop", vec![execute_pipeline("Run", &self.name(i + 1))])]
                } else {
                    Vec::new()
                };
                pipeline(&self.name(i), activities)
            })
            .collect()
    }

    /// One root invoking `width` leaves, spread across Switch cases.
    #[must_use]
    pub fn fan_out(&self, width: usize) -> Vec<PipelineComponent> {
        let cases = (0..width)
            .map(|i| SwitchCase::new(i.to_string(), vec![execute_pipeline("Run", &self.name(i + 1))]))
            .collect();
        let mut batch = vec![pipeline(&self.name(0), vec![switch("Route", cases, vec![])])];
        batch.extend((0..width).map(|i| pipeline(&self.name(i + 1), Vec::new())));
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_chain() {
        let batch = PipelineChain::new("p").linear(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].name, "p0000");
        assert_eq!(batch[0].activity_count(), 2);
        assert!(batch[2].activities.is_empty());
    }

    #[test]
    fn test_fan_out() {
        let batch = PipelineChain::new("f").fan_out(4);
        assert_eq!(batch.len(), 5);
        assert_eq!(batch[0].activity_count(), 5);
    }
}
