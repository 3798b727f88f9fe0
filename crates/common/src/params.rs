//! Coercion of `key=value` strings into the typed inputs a workflow declares.

use serde_json::{Map, Number, Value};

use crate::models::{Workflow, WorkflowInput};
use crate::validation::ValidationError;

/// Splits `key=value`. The value may itself contain `=`.
pub fn split_assignment(raw: &str) -> Result<(&str, &str), ValidationError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(ValidationError::InvalidParameter {
            name: raw.to_string(),
            expected: "key=value".to_string(),
            reason: "missing '='".to_string(),
        }),
    }
}

fn invalid(input: &WorkflowInput, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidParameter {
        name: input.name.clone(),
        expected: input.input_type.clone(),
        reason: reason.into(),
    }
}

/// Converts one raw value according to the input's declared type.
pub fn coerce_value(input: &WorkflowInput, raw: &str) -> Result<Value, ValidationError> {
    let trimmed = raw.trim();
    match input.input_type.as_str() {
        "integer" => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| invalid(input, e.to_string())),
        "number" => {
            let parsed = trimmed
                .parse::<f64>()
                .map_err(|e| invalid(input, e.to_string()))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| invalid(input, "not a finite number"))
        }
        "boolean" => match trimmed.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            other => Err(invalid(input, format!("'{other}' is not a boolean"))),
        },
        "object" => match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err(invalid(input, "expected a JSON object")),
            Err(e) => Err(invalid(input, e.to_string())),
        },
        "array" => match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Array(_)) => Ok(value),
            Ok(_) => Err(invalid(input, "expected a JSON array")),
            Err(e) => Err(invalid(input, e.to_string())),
        },
        // "string" and anything the service invents later.
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Builds the `parameters` object for a submission.
///
/// Boolean inputs left unset are sent as `false`. Required inputs without a
/// value or a declared default are rejected; inputs with a default are left
/// to the service.
pub fn build_parameters<'a, I>(
    workflow: &Workflow,
    assignments: I,
) -> Result<Map<String, Value>, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parameters = Map::new();
    for raw in assignments {
        let (key, value) = split_assignment(raw)?;
        let input = workflow
            .input(key)
            .ok_or_else(|| ValidationError::UnknownParameter(key.to_string()))?;
        parameters.insert(input.name.clone(), coerce_value(input, value)?);
    }

    for input in &workflow.inputs {
        if parameters.contains_key(&input.name) {
            continue;
        }
        if input.input_type == "boolean" {
            parameters.insert(input.name.clone(), Value::Bool(false));
        } else if input.required && input.default.is_none() {
            return Err(ValidationError::MissingParameter(input.name.clone()));
        }
    }
    Ok(parameters)
}
