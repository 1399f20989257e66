//! MCP Server implementation
//!
//! The main server struct that binds the JSON-RPC transport to the
//! [`Dispatcher`].

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::ServerConfig;
use crate::handlers::Dispatcher;
use crate::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::runtime::{ContainerRuntime, DockerCli};
use crate::tools::{ToolDefinition, ToolResult};
use crate::{Error, Result};

/// MCP Server exposing container operations
///
/// Requests are handled one at a time; each `tools/call` blocks until its
/// runtime process has exited.
///
/// # Example
///
/// ```ignore
/// use docker_mcp::{DockerMcpServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = DockerMcpServer::new(&ServerConfig::default());
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct DockerMcpServer {
    dispatcher: Dispatcher,

    /// Whether the server has been initialized
    initialized: bool,

    /// Advertised tool catalog
    tools: Vec<ToolDefinition>,
}

impl DockerMcpServer {
    /// Create a server backed by the `docker` CLI
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_runtime(Arc::new(DockerCli::from_config(config)))
    }

    /// Create a server backed by an arbitrary runtime
    pub fn with_runtime(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            dispatcher: Dispatcher::new(runtime),
            initialized: false,
            tools: Vec::new(),
        }
    }

    /// Load the tool catalog
    pub async fn initialize(&mut self) -> Result<()> {
        self.tools = self.dispatcher.list_operations();
        self.initialized = true;
        tracing::info!(tools = self.tools.len(), "Initialized MCP server");
        Ok(())
    }

    /// Run the MCP server over stdin/stdout
    pub async fn run(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock()).await
    }

    /// Process newline-delimited JSON-RPC messages until `reader` is exhausted
    pub async fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<()> {
        if !self.initialized {
            self.initialize().await?;
        }

        tracing::info!("MCP server ready");

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = self.handle_message(&line).await?;
            if !response.is_empty() {
                writeln!(writer, "{}", response)?;
                writer.flush()?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the serialized JSON-RPC response, or an empty string for
    /// notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed JSON-RPC message");
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.jsonrpc != "2.0" {
            let response = JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            );
            return serde_json::to_string(&response).map_err(Error::from);
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "notifications/cancelled" => {
                tracing::debug!(params = %request.params, "Ignoring cancellation notice");
                return Ok(String::new());
            }
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            // A call without an id cannot be answered, so it is never run
            "tools/call" if request.id.is_none() => {
                tracing::warn!("Rejecting tools/call sent as a notification");
                JsonRpcResponse::error(
                    None,
                    INVALID_REQUEST,
                    "tools/call requires an id".to_string(),
                )
            }
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            method if request.id.is_none() => {
                tracing::debug!(method, "Ignoring unknown notification");
                return Ok(String::new());
            }
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    /// Handle the initialize request
    fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            Err(e) => tracing::debug!(error = %e, "Initialize without client info"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "docker-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                ));
            }
        };

        match self.dispatcher.handle(&call.name, &call.arguments).await {
            Ok(text) => Ok(JsonRpcResponse::success(
                id,
                serde_json::to_value(ToolResult::text(text))?,
            )),
            Err(e) => Ok(JsonRpcResponse::tool_error(id, &e)),
        }
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
