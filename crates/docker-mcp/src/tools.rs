//! MCP tool registry
//!
//! The catalog of operations exposed to agents. Each operation is backed by a
//! single `docker` invocation.
//!
//! # Containers
//! - `docker_ps` - List running containers
//! - `docker_ps_all` - List all containers, including stopped ones
//! - `docker_port` - Show port mappings of a container
//! - `docker_logs` - Fetch the last lines of a container's logs
//! - `docker_inspect` - Full JSON metadata of a container
//! - `docker_stats` - Resource usage of running containers
//! - `docker_delete` - Remove a container
//!
//! # Images
//! - `docker_images` - List local images

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{self, ContainerId, ParamDefault, ParamKind, ParamSpec};
use crate::{Error, Result};

/// Lines returned by `docker_logs` when `tail` is omitted
pub const DEFAULT_LOG_TAIL: u64 = 100;

const CONTAINER: ParamSpec =
    ParamSpec::required("container", ParamKind::Container, "Container name or ID");

/// Identifies one registered operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Ps,
    PsAll,
    Port,
    Logs,
    Inspect,
    Stats,
    Images,
    Delete,
}

impl OperationKind {
    /// Registration order, which is also the advertised order
    pub const ALL: [OperationKind; 8] = [
        Self::Ps,
        Self::PsAll,
        Self::Port,
        Self::Logs,
        Self::Inspect,
        Self::Stats,
        Self::Images,
        Self::Delete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ps => "docker_ps",
            Self::PsAll => "docker_ps_all",
            Self::Port => "docker_port",
            Self::Logs => "docker_logs",
            Self::Inspect => "docker_inspect",
            Self::Stats => "docker_stats",
            Self::Images => "docker_images",
            Self::Delete => "docker_delete",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ps => "List running Docker containers",
            Self::PsAll => "List all Docker containers, including stopped ones",
            Self::Port => "Show port mappings for a container",
            Self::Logs => "Fetch the most recent log lines of a container",
            Self::Inspect => "Show detailed JSON metadata for a container",
            Self::Stats => "Show resource usage statistics of running containers",
            Self::Images => "List local Docker images",
            Self::Delete => "Delete a container (irreversible)",
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        const CONTAINER_ONLY: &[ParamSpec] = &[CONTAINER];
        const LOGS: &[ParamSpec] = &[
            CONTAINER,
            ParamSpec::optional(
                "tail",
                ParamKind::Integer,
                "Number of lines to show from the end of the logs",
                ParamDefault::Integer(DEFAULT_LOG_TAIL),
            ),
        ];
        const STATS: &[ParamSpec] = &[ParamSpec::optional(
            "no_stream",
            ParamKind::Boolean,
            "Take a single snapshot instead of streaming",
            ParamDefault::Boolean(true),
        )];
        const DELETE: &[ParamSpec] = &[
            CONTAINER,
            ParamSpec::optional(
                "force",
                ParamKind::Boolean,
                "Force removal of a running container",
                ParamDefault::Boolean(false),
            ),
        ];

        match self {
            Self::Ps | Self::PsAll | Self::Images => &[],
            Self::Port | Self::Inspect => CONTAINER_ONLY,
            Self::Logs => LOGS,
            Self::Stats => STATS,
            Self::Delete => DELETE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Validate raw arguments into a typed operation
    pub fn parse(self, arguments: &Value) -> Result<Operation> {
        let p = params::validate(self.params(), arguments)?;
        let operation = match self {
            Self::Ps => Operation::Ps,
            Self::PsAll => Operation::PsAll,
            Self::Port => Operation::Port {
                container: p.container("container")?,
            },
            Self::Logs => Operation::Logs {
                container: p.container("container")?,
                tail: p.integer("tail")?,
            },
            Self::Inspect => Operation::Inspect {
                container: p.container("container")?,
            },
            Self::Stats => Operation::Stats {
                no_stream: p.boolean("no_stream")?,
            },
            Self::Images => Operation::Images,
            Self::Delete => Operation::Delete {
                container: p.container("container")?,
                force: p.boolean("force")?,
            },
        };
        Ok(operation)
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: params::input_schema(self.params()),
        }
    }
}

/// A validated operation with its typed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Ps,
    PsAll,
    Port { container: ContainerId },
    Logs { container: ContainerId, tail: u64 },
    Inspect { container: ContainerId },
    Stats { no_stream: bool },
    Images,
    Delete { container: ContainerId, force: bool },
}

impl Operation {
    /// Look up `name` and validate `arguments` against its schema
    pub fn from_call(name: &str, arguments: &Value) -> Result<Self> {
        let kind =
            OperationKind::from_name(name).ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        kind.parse(arguments)
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Ps => OperationKind::Ps,
            Self::PsAll => OperationKind::PsAll,
            Self::Port { .. } => OperationKind::Port,
            Self::Logs { .. } => OperationKind::Logs,
            Self::Inspect { .. } => OperationKind::Inspect,
            Self::Stats { .. } => OperationKind::Stats,
            Self::Images => OperationKind::Images,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }
}

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
        }
    }
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    OperationKind::ALL
        .into_iter()
        .map(OperationKind::definition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definitions_count() {
        assert_eq!(get_tool_definitions().len(), 8);
    }

    #[test]
    fn test_tool_definitions_are_stable() {
        let first = serde_json::to_value(get_tool_definitions()).unwrap();
        let second = serde_json::to_value(get_tool_definitions()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tool_names_unique_and_resolvable() {
        let tools = get_tool_definitions();
        for tool in &tools {
            assert_eq!(
                tools.iter().filter(|t| t.name == tool.name).count(),
                1,
                "duplicate tool {}",
                tool.name
            );
            let kind = OperationKind::from_name(&tool.name).unwrap();
            assert_eq!(kind.name(), tool.name);
        }
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(OperationKind::from_name("docker_run"), None);
        assert_eq!(OperationKind::from_name(""), None);
        assert_eq!(OperationKind::from_name("DOCKER_PS"), None);
    }

    #[test]
    fn test_parse_typed_operations() {
        assert_eq!(
            Operation::from_call("docker_logs", &json!({"container": "web"})).unwrap(),
            Operation::Logs {
                container: ContainerId::parse("web").unwrap(),
                tail: 100,
            }
        );
        assert_eq!(
            Operation::from_call("docker_stats", &Value::Null).unwrap(),
            Operation::Stats { no_stream: true }
        );
        assert_eq!(
            Operation::from_call("docker_delete", &json!({"container": "db", "force": true}))
                .unwrap(),
            Operation::Delete {
                container: ContainerId::parse("db").unwrap(),
                force: true,
            }
        );
    }

    #[test]
    fn test_kind_round_trip() {
        let op = Operation::from_call("docker_images", &json!({})).unwrap();
        assert_eq!(op.kind(), OperationKind::Images);
    }

    #[test]
    fn test_unknown_operation_ignores_arguments() {
        let err = Operation::from_call("docker_exec", &json!("not even an object")).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(name) if name == "docker_exec"));
    }

    #[test]
    fn test_tool_result_serialize() {
        let result = ToolResult::text("Hello, world!");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({"content": [{"type": "text", "text": "Hello, world!"}]})
        );
    }

    #[test]
    fn test_definition_serializes_input_schema_camel_case() {
        let json = serde_json::to_value(OperationKind::Port.definition()).unwrap();
        assert!(json.get("inputSchema").is_some());
        assert_eq!(json["inputSchema"]["required"], json!(["container"]));
    }
}
