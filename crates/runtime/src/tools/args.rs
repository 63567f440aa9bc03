//! Parsing and validation of model-emitted tool arguments.

use super::{ParameterSpec, ToolArgs, ToolError};
use serde_json::Value;

/// Parse `raw` as a relaxed-JSON (JSON5) object.
///
/// Models commonly emit unquoted keys, single-quoted strings and trailing
/// commas, all of which are accepted. Blank input is an empty object.
pub fn parse_arguments(raw: &str) -> Result<ToolArgs, ToolError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(ToolArgs::new());
    }

    let value: Value =
        json5::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

/// Check `args` against `params`: every required parameter present and every
/// declared parameter coercible to its type.
///
/// Undeclared keys are passed through untouched; `null` for an optional
/// parameter is treated as absent.
pub fn validate_arguments(
    params: &[ParameterSpec],
    mut args: ToolArgs,
) -> Result<ToolArgs, ToolError> {
    for param in params {
        match args.remove(&param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                let found = kind(&value);
                let coerced = param.type_tag.coerce(value).ok_or_else(|| {
                    ToolError::InvalidArguments(format!(
                        "parameter '{}' expects {}, got {found}",
                        param.name, param.type_tag
                    ))
                })?;
                args.insert(param.name.clone(), coerced);
            }
        }
    }
    Ok(args)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
