//! Ingestion of the platform's pipeline JSON.
//!
//! Activities follow the platform schema: `name`, `type`, and a
//! `typeProperties` object whose shape depends on `type`. Conversion is
//! lenient per activity: a malformed activity is dropped with a
//! [`Diagnostic`] and its siblings are still converted.

use crate::core::{Activity, ActivityKind, ActivityPath, PipelineComponent, SwitchCase};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::errors::DefinitionError;
use serde_json::Value;

/// A component built from JSON plus the notices raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDefinition {
    /// The converted pipeline.
    pub component: PipelineComponent,
    /// Activities that were skipped, in document order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts one pipeline definition.
///
/// Accepts both the resource shape (`{"name", "properties": {"activities"}}`)
/// and the flattened shape (`{"name", "activities"}`).
///
/// # Errors
///
/// Returns an error if the value is not an object or has no non-empty name.
pub fn parse_pipeline(value: &Value) -> Result<ParsedDefinition, DefinitionError> {
    let obj = value.as_object().ok_or(DefinitionError::NotAnObject)?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .ok_or(DefinitionError::MissingName)?;

    let list = obj
        .get("properties")
        .and_then(|p| p.get("activities"))
        .or_else(|| obj.get("activities"));

    let mut ctx = Ingest {
        pipeline: name,
        diagnostics: Vec::new(),
    };
    let root = ActivityPath::root();
    let activities = match list_items(list) {
        Ok(items) => ctx.activities(items, &root),
        Err(reason) => {
            ctx.malformed(None, &root, format!("pipeline activities {reason}"));
            Vec::new()
        }
    };

    Ok(ParsedDefinition {
        component: PipelineComponent {
            name: name.to_string(),
            activities,
        },
        diagnostics: ctx.diagnostics,
    })
}

struct Ingest<'a> {
    pipeline: &'a str,
    diagnostics: Vec<Diagnostic>,
}

impl Ingest<'_> {
    fn activities(&mut self, items: &[Value], path: &ActivityPath) -> Vec<Activity> {
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| self.activity(index, item, path))
            .collect()
    }

    fn activity(&mut self, index: usize, value: &Value, path: &ActivityPath) -> Option<Activity> {
        let Some(obj) = value.as_object() else {
            self.malformed(None, path, format!("activity #{index} is not an object"));
            return None;
        };
        let Some(name) = obj.get("name").and_then(Value::as_str) else {
            self.malformed(None, path, format!("activity #{index} has no name"));
            return None;
        };
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            self.malformed(Some(name), path, "activity has no type".to_string());
            return None;
        };

        let props = obj.get("typeProperties");
        let nested = path.child(name);
        let result = match ActivityKind::from_type_name(type_name) {
            ActivityKind::ExecutePipeline => Ok(execute_pipeline(name, props)),
            ActivityKind::ForEach => self
                .child_list(props, "activities", &nested)
                .map(|activities| Activity::for_each(name, activities)),
            ActivityKind::Until => self
                .child_list(props, "activities", &nested)
                .map(|activities| Activity::until(name, activities)),
            ActivityKind::IfCondition => self.if_condition(name, props, &nested),
            ActivityKind::Switch => self.switch(name, props, &nested),
            ActivityKind::Other => Ok(Activity::other(name, type_name)),
        };

        match result {
            Ok(activity) => Some(activity),
            Err(reason) => {
                self.malformed(Some(name), path, format!("{type_name} activity {reason}"));
                None
            }
        }
    }

    fn if_condition(
        &mut self,
        name: &str,
        props: Option<&Value>,
        nested: &ActivityPath,
    ) -> Result<Activity, String> {
        // Validate both lists before converting either so a malformed
        // container does not leave half its children's notices behind.
        list_items(props.and_then(|p| p.get("ifTrueActivities")))
            .map_err(|r| format!("ifTrueActivities {r}"))?;
        list_items(props.and_then(|p| p.get("ifFalseActivities")))
            .map_err(|r| format!("ifFalseActivities {r}"))?;

        let if_true = self.child_list(props, "ifTrueActivities", nested)?;
        let if_false = self.child_list(props, "ifFalseActivities", nested)?;
        Ok(Activity::if_condition(name, if_true, if_false))
    }

    fn switch(
        &mut self,
        name: &str,
        props: Option<&Value>,
        nested: &ActivityPath,
    ) -> Result<Activity, String> {
        let cases = list_items(props.and_then(|p| p.get("cases"))).map_err(|r| format!("cases {r}"))?;
        list_items(props.and_then(|p| p.get("defaultActivities")))
            .map_err(|r| format!("defaultActivities {r}"))?;
        for (i, case) in cases.iter().enumerate() {
            if !case.is_object() {
                return Err(format!("case #{i} is not an object"));
            }
            list_items(case.get("activities")).map_err(|r| format!("case #{i} activities {r}"))?;
        }

        let mut converted = Vec::with_capacity(cases.len());
        for case in cases {
            let value = case_value(case.get("value"));
            let activities = self.child_list(Some(case), "activities", nested)?;
            converted.push(SwitchCase::new(value, activities));
        }
        let default = self.child_list(props, "defaultActivities", nested)?;
        Ok(Activity::switch(name, converted, default))
    }

    fn child_list(
        &mut self,
        props: Option<&Value>,
        key: &str,
        nested: &ActivityPath,
    ) -> Result<Vec<Activity>, String> {
        let items = list_items(props.and_then(|p| p.get(key))).map_err(|r| format!("{key} {r}"))?;
        Ok(self.activities(items, nested))
    }

    fn malformed(&mut self, activity: Option<&str>, path: &ActivityPath, message: String) {
        let diagnostic = Diagnostic::new(DiagnosticCode::MalformedActivity, self.pipeline, message);
        let diagnostic = match activity {
            Some(name) => diagnostic.at(name, path.clone()),
            None => Diagnostic {
                path: path.clone(),
                ..diagnostic
            },
        };
        self.diagnostics.push(diagnostic);
    }
}

/// Absent or `null` lists are empty; anything other than an array is malformed.
fn list_items(value: Option<&Value>) -> Result<&[Value], String> {
    match value {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err("is not an array".to_string()),
    }
}

fn execute_pipeline(name: &str, props: Option<&Value>) -> Activity {
    let pipeline = props
        .and_then(|p| p.get("pipeline"))
        .and_then(|p| p.get("referenceName"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let wait_on_completion = props
        .and_then(|p| p.get("waitOnCompletion"))
        .and_then(Value::as_bool)
        .unwrap_or(true);

    Activity::ExecutePipeline {
        name: name.to_string(),
        pipeline,
        wait_on_completion,
    }
}

fn case_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
