//! Workflow definition files are YAML; the dispatch trigger's `inputs`
//! section is the procedure's parameter schema.

use indexmap::IndexMap;
use rpchub_core::{CallError, CallResult, ParamType, Parameter};
use serde::Deserialize;

pub(crate) const DISPATCH_TRIGGER: &str = "workflow_dispatch";

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowDefinition {
    /// Trigger name to trigger body. Triggers without configuration
    /// deserialize to `None`.
    #[serde(default, rename = "on")]
    on: IndexMap<String, Option<TriggerDefinition>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TriggerDefinition {
    #[serde(default)]
    inputs: Option<IndexMap<String, InputDefinition>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InputDefinition {
    #[serde(default)]
    description: String,
    #[serde(default)]
    required: bool,
    #[serde(rename = "type")]
    input_type: Option<String>,
}

pub(crate) fn parse_definition(content: &str) -> CallResult<WorkflowDefinition> {
    serde_yaml::from_str(content)
        .map_err(|e| CallError::SchemaParse(format!("invalid workflow definition: {e}")))
}

impl WorkflowDefinition {
    pub(crate) fn has_dispatch_trigger(&self) -> bool {
        self.on.contains_key(DISPATCH_TRIGGER)
    }

    /// Parameters declared under the dispatch trigger, in file order.
    /// Input types other than boolean/number/string fall back to string,
    /// matching how the backend itself treats them.
    pub(crate) fn dispatch_params(&self) -> CallResult<Vec<Parameter>> {
        let trigger = self.on.get(DISPATCH_TRIGGER).ok_or_else(|| {
            CallError::SchemaParse(format!("workflow has no {DISPATCH_TRIGGER} trigger"))
        })?;

        let Some(inputs) = trigger.as_ref().and_then(|t| t.inputs.as_ref()) else {
            return Ok(Vec::new());
        };

        Ok(inputs
            .iter()
            .map(|(name, input)| {
                let param_type = match input.input_type.as_deref() {
                    Some(t) if t.eq_ignore_ascii_case("boolean") => ParamType::Bool,
                    Some(t) if t.eq_ignore_ascii_case("number") => ParamType::Int,
                    _ => ParamType::String,
                };
                Parameter {
                    name: name.clone(),
                    param_type,
                    description: input.description.clone(),
                    required: input.required,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPATCHABLE: &str = r#"
name: deploy
on:
  push:
  workflow_dispatch:
    inputs:
      environment:
        description: Target environment
        required: true
        type: string
      replicas:
        description: Instance count
        type: number
      dry_run:
        type: boolean
"#;

    #[test]
    fn dispatch_inputs_become_params_in_file_order() {
        let definition = parse_definition(DISPATCHABLE).unwrap();
        assert!(definition.has_dispatch_trigger());

        let params = definition.dispatch_params().unwrap();
        assert_eq!(params.len(), 3);

        assert_eq!(params[0].name, "environment");
        assert_eq!(params[0].param_type, ParamType::String);
        assert_eq!(params[0].description, "Target environment");
        assert!(params[0].required);

        assert_eq!(params[1].name, "replicas");
        assert_eq!(params[1].param_type, ParamType::Int);
        assert!(!params[1].required);

        assert_eq!(params[2].name, "dry_run");
        assert_eq!(params[2].param_type, ParamType::Bool);
    }

    #[test]
    fn dispatch_trigger_without_inputs_yields_no_params() {
        let definition = parse_definition("on:\n  workflow_dispatch:\n").unwrap();
        assert!(definition.has_dispatch_trigger());
        assert!(definition.dispatch_params().unwrap().is_empty());
    }

    #[test]
    fn unknown_input_type_falls_back_to_string() {
        let definition = parse_definition(
            "on:\n  workflow_dispatch:\n    inputs:\n      choice_input:\n        type: choice\n",
        )
        .unwrap();
        let params = definition.dispatch_params().unwrap();
        assert_eq!(params[0].param_type, ParamType::String);
    }

    #[test]
    fn missing_dispatch_trigger_is_detected() {
        let definition = parse_definition("on:\n  push:\n").unwrap();
        assert!(!definition.has_dispatch_trigger());
        assert!(matches!(
            definition.dispatch_params().unwrap_err(),
            CallError::SchemaParse(_)
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_definition("on: [not: valid").unwrap_err();
        assert!(matches!(err, CallError::SchemaParse(_)));
    }
}
