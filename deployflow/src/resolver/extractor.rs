//! Reference extractor.

use crate::core::{Activity, ActivityPath, PipelineReference};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Outcome of classifying one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The activity does not invoke a pipeline.
    NotApplicable,
    /// The activity invokes a pipeline.
    Reference(PipelineReference),
    /// The activity invokes a pipeline but names no target.
    MissingTarget(Diagnostic),
}

/// Classifies `activity` and builds its dependency edge when it has one.
///
/// Does not recurse; nested activities are reached through the walker.
#[must_use]
pub fn extract_reference(parent: &str, activity: &Activity, path: &ActivityPath) -> Extraction {
    let Activity::ExecutePipeline {
        name,
        pipeline,
        wait_on_completion,
    } = activity
    else {
        return Extraction::NotApplicable;
    };

    match pipeline.as_deref().map(str::trim) {
        Some(target) if !target.is_empty() => Extraction::Reference(PipelineReference {
            parent_pipeline_name: parent.to_string(),
            target_pipeline_name: target.to_string(),
            activity_name: name.clone(),
            path: path.clone(),
            wait_on_completion: *wait_on_completion,
        }),
        _ => Extraction::MissingTarget(
            Diagnostic::new(
                DiagnosticCode::MissingInvokeTarget,
                parent,
                "ExecutePipeline activity does not name a target pipeline",
            )
            .at(name.clone(), path.clone()),
        ),
    }
}
