//! MCP Server for Docker container management
//!
//! This crate exposes a fixed set of container operations via the Model Context
//! Protocol (MCP), allowing agents to list, inspect and remove containers on the
//! host by delegating to the `docker` command-line client.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (agent) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ DockerMcpServer ]  protocol + transport
//!        |
//!        v
//! [ Dispatcher ]       name lookup, parameter validation
//!        |
//!        v
//! [ ContainerRuntime ] one `docker` process per call
//! ```
//!
//! # Tools
//!
//! - `docker_ps`, `docker_ps_all` - container listings
//! - `docker_port`, `docker_logs`, `docker_inspect` - per-container details
//! - `docker_stats` - resource usage, as a snapshot or a bounded stream
//! - `docker_images` - image listing
//! - `docker_delete` - container removal

pub mod config;
pub mod error;
pub mod handlers;
pub mod params;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use handlers::{Dispatcher, NO_PORTS_MAPPED};
pub use params::ContainerId;
pub use runtime::{CommandOutput, ContainerRuntime, DockerCli, Invocation, RunMode};
pub use server::DockerMcpServer;
pub use tools::{
    DEFAULT_LOG_TAIL, Operation, OperationKind, ToolContent, ToolDefinition, ToolResult,
    get_tool_definitions,
};
