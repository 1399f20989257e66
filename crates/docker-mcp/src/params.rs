//! Parameter schemas and validation
//!
//! Every operation declares its parameters as a static list of [`ParamSpec`].
//! The same list produces the JSON schema advertised on `tools/list` and drives
//! validation of the raw argument object received on `tools/call`, so the two
//! cannot drift apart.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// Container names and IDs as accepted by the runtime itself
static CONTAINER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap());

const MAX_CONTAINER_ID_LEN: usize = 255;

/// A validated container name or ID
///
/// Only the runtime's own identifier grammar is accepted, which rules out
/// whitespace, shell metacharacters and a leading `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_parameters("container must not be empty"));
        }
        if trimmed.len() > MAX_CONTAINER_ID_LEN {
            return Err(Error::invalid_parameters(format!(
                "container must be at most {} bytes",
                MAX_CONTAINER_ID_LEN
            )));
        }
        if !CONTAINER_ID_PATTERN.is_match(trimmed) {
            return Err(Error::invalid_parameters(format!(
                "container {:?} is not a valid container name or ID",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Container name or ID, advertised as a string
    Container,
    /// Non-negative integer
    Integer,
    Boolean,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::Container => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// Fallback used when an optional parameter is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Integer(u64),
    Boolean(bool),
}

/// Declaration of a single operation parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// `None` marks the parameter as required
    pub default: Option<ParamDefault>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    pub const fn optional(
        name: &'static str,
        kind: ParamKind,
        description: &'static str,
        default: ParamDefault,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Build the JSON schema object for a parameter list
pub fn input_schema(specs: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for spec in specs {
        let mut property = json!({
            "type": spec.kind.json_type(),
            "description": spec.description,
        });
        match spec.default {
            Some(ParamDefault::Integer(n)) => {
                property["default"] = json!(n);
                property["minimum"] = json!(0);
            }
            Some(ParamDefault::Boolean(b)) => property["default"] = json!(b),
            None => {}
        }
        properties.insert(spec.name.to_string(), property);
    }

    let required: Vec<&str> = specs
        .iter()
        .filter(|s| s.is_required())
        .map(|s| s.name)
        .collect();

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

/// A validated parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamValue {
    Container(ContainerId),
    Integer(u64),
    Boolean(bool),
}

/// Parameters that passed validation, with defaults applied
#[derive(Debug, Default)]
pub struct ValidatedParams {
    values: HashMap<&'static str, ParamValue>,
}

impl ValidatedParams {
    pub fn container(&self, name: &str) -> Result<ContainerId> {
        match self.values.get(name) {
            Some(ParamValue::Container(id)) => Ok(id.clone()),
            _ => Err(Error::invalid_parameters(format!("missing parameter: {}", name))),
        }
    }

    pub fn integer(&self, name: &str) -> Result<u64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(n)) => Ok(*n),
            _ => Err(Error::invalid_parameters(format!("missing parameter: {}", name))),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.values.get(name) {
            Some(ParamValue::Boolean(b)) => Ok(*b),
            _ => Err(Error::invalid_parameters(format!("missing parameter: {}", name))),
        }
    }
}

/// Validate a raw argument value against a parameter list
///
/// `null` (or an absent `arguments` field) counts as an empty object. Keys not
/// declared in `specs` are ignored. An explicit `null` for an optional
/// parameter falls back to its default.
pub fn validate(specs: &[ParamSpec], raw: &Value) -> Result<ValidatedParams> {
    let empty = Map::new();
    let args = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(Error::invalid_parameters(format!(
                "arguments must be an object, got {}",
                json_type_name(other)
            )));
        }
    };

    for key in args.keys() {
        if !specs.iter().any(|s| s.name == key) {
            tracing::debug!(parameter = %key, "Ignoring unrecognized parameter");
        }
    }

    let mut validated = ValidatedParams::default();
    for spec in specs {
        let value = match args.get(spec.name) {
            Some(Value::Null) | None => match spec.default {
                Some(ParamDefault::Integer(n)) => ParamValue::Integer(n),
                Some(ParamDefault::Boolean(b)) => ParamValue::Boolean(b),
                None => {
                    return Err(Error::invalid_parameters(format!(
                        "missing required parameter: {}",
                        spec.name
                    )));
                }
            },
            Some(value) => parse_value(spec, value)?,
        };
        validated.values.insert(spec.name, value);
    }

    Ok(validated)
}

fn parse_value(spec: &ParamSpec, value: &Value) -> Result<ParamValue> {
    match spec.kind {
        ParamKind::Container => match value {
            Value::String(s) => ContainerId::parse(s).map(ParamValue::Container),
            other => Err(type_mismatch(spec, other)),
        },
        ParamKind::Integer => match value {
            Value::Number(n) => n
                .as_u64()
                .map(ParamValue::Integer)
                .ok_or_else(|| not_a_count(spec, &n.to_string())),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map(ParamValue::Integer)
                .map_err(|_| not_a_count(spec, s)),
            other => Err(type_mismatch(spec, other)),
        },
        ParamKind::Boolean => match value {
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            other => Err(type_mismatch(spec, other)),
        },
    }
}

fn type_mismatch(spec: &ParamSpec, value: &Value) -> Error {
    Error::invalid_parameters(format!(
        "{} must be of type {}, got {}",
        spec.name,
        spec.kind.json_type(),
        json_type_name(value)
    ))
}

fn not_a_count(spec: &ParamSpec, raw: &str) -> Error {
    Error::invalid_parameters(format!(
        "{} must be a non-negative integer, got {}",
        spec.name, raw
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
