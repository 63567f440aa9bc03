//! Tool-related types.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Convert `value` to this type where the conversion is lossless enough
    /// for model-emitted arguments, e.g. `"3"` for a number or `42` for a
    /// string.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (Self::String, v @ Value::String(_)) => Some(v),
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

            (Self::Number, v @ Value::Number(_)) => Some(v),
            (Self::Number, Value::String(s)) => parse_number(s.trim()),

            (Self::Integer, Value::Number(n)) => integer(&n),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

            (Self::Boolean, v @ Value::Bool(_)) => Some(v),
            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },

            (Self::Array, v @ Value::Array(_)) => Some(v),
            (Self::Object, v @ Value::Object(_)) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn integer(n: &Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return Some(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Value::from(u));
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| Value::from(f as i64))
}

/// A declared tool parameter.
///
/// Serializes in the shape shown to the model:
/// `{"name", "description", "required", "schema": {"type"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub type_tag: ParamType,
}

impl ParameterSpec {
    /// Create a required parameter.
    pub fn required(
        name: impl Into<String>,
        type_tag: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            type_tag,
        }
    }

    /// Create an optional parameter.
    pub fn optional(
        name: impl Into<String>,
        type_tag: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, type_tag, description)
        }
    }
}

impl Serialize for ParameterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Schema {
            #[serde(rename = "type")]
            type_tag: ParamType,
        }

        let mut state = serializer.serialize_struct("ParameterSpec", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("required", &self.required)?;
        state.serialize_field(
            "schema",
            &Schema {
                type_tag: self.type_tag,
            },
        )?;
        state.end()
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    /// Unique key the model uses in `Action:`.
    pub internal_name: String,
    /// Human-facing API name.
    pub display_name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    pub fn new(
        internal_name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Parameters rendered as a JSON array.
    pub fn parameters_json(&self) -> String {
        // Serializing plain strings and bools cannot fail.
        serde_json::to_string(&self.parameters).unwrap_or_else(|_| "[]".to_string())
    }
}
