//! Parameter schemas for tools.
//!
//! A schema is an ordered list of named parameters, each with a JSON type and
//! a required flag. Validation is a pure function of schema + supplied map,
//! independent of any tool implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The JSON type a parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }

    /// Whether a JSON value has this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }
}

/// One accepted parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
    /// Allowed values, if the parameter is an enumeration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<Value>,
}

/// The full parameter schema of a tool, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
            allowed: Vec::new(),
        });
        self
    }

    /// Add an optional parameter.
    pub fn optional(mut self, name: &str, kind: ParamKind, description: &str) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
            allowed: Vec::new(),
        });
        self
    }

    /// Restrict the most recently added parameter to a set of values.
    pub fn one_of(mut self, values: &[&str]) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.allowed = values.iter().map(|v| Value::String((*v).into())).collect();
        }
        self
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Validate supplied parameters against this schema.
    ///
    /// Required parameters must be present and every supplied parameter must
    /// be declared, have the declared type, and respect its allowed values.
    /// Omitted optional parameters are always valid.
    pub fn validate(&self, supplied: &Map<String, Value>) -> Result<(), String> {
        for spec in self.params.iter().filter(|p| p.required) {
            if !supplied.contains_key(&spec.name) {
                return Err(format!("missing required parameter '{}'", spec.name));
            }
        }

        for (name, value) in supplied {
            let spec = self
                .get(name)
                .ok_or_else(|| format!("unexpected parameter '{name}'"))?;

            if !spec.kind.matches(value) {
                return Err(format!(
                    "parameter '{}' must be of type {}, got {}",
                    name,
                    spec.kind.as_str(),
                    json_type_name(value)
                ));
            }

            if !spec.allowed.is_empty() && !spec.allowed.contains(value) {
                return Err(format!("parameter '{name}' has unsupported value {value}"));
            }
        }

        Ok(())
    }

    /// Render as a JSON Schema object (properties in declaration order).
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(p.kind.as_str()));
            if !p.allowed.is_empty() {
                prop.insert("enum".into(), Value::Array(p.allowed.clone()));
            }
            prop.insert("description".into(), json!(p.description));
            properties.insert(p.name.clone(), Value::Object(prop));
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
