//! MCP Tool Handlers
//!
//! The [`Dispatcher`] resolves a tool name, validates its arguments into a
//! typed [`Operation`] and runs the matching handler. Every handler is one
//! runtime invocation followed by an output transform. Nothing is retried.

use std::sync::Arc;

use serde_json::Value;

use crate::params::ContainerId;
use crate::runtime::{CommandOutput, ContainerRuntime, Invocation};
use crate::tools::{Operation, OperationKind, ToolDefinition, get_tool_definitions};
use crate::{Error, Result};

/// Text returned by `docker_port` when a container publishes nothing
pub const NO_PORTS_MAPPED: &str = "No ports mapped";

const PS_FORMAT: &str = "table {{.ID}}\t{{.Names}}\t{{.Image}}\t{{.Status}}\t{{.Ports}}";
const IMAGES_FORMAT: &str = "table {{.Repository}}\t{{.Tag}}\t{{.ID}}\t{{.CreatedAt}}\t{{.Size}}";

/// Routes tool calls to their handlers
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Arc<dyn ContainerRuntime>,
}

impl Dispatcher {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// The advertised operation catalog
    pub fn list_operations(&self) -> Vec<ToolDefinition> {
        get_tool_definitions()
    }

    /// Handle a tool call by dispatching to the appropriate handler
    ///
    /// Unknown names and invalid arguments are rejected before any process is
    /// started.
    pub async fn handle(&self, tool_name: &str, arguments: &Value) -> Result<String> {
        let operation = Operation::from_call(tool_name, arguments)?;
        tracing::info!(operation = tool_name, "Dispatching operation");

        let runtime = self.runtime.as_ref();
        let inv = invocation(&operation);
        let result = match &operation {
            Operation::Ps | Operation::PsAll | Operation::Images => {
                handle_listing(runtime, &inv).await
            }
            Operation::Port { .. } => handle_port(runtime, &inv).await,
            Operation::Logs { .. } => handle_logs(runtime, &inv).await,
            Operation::Inspect { container } => handle_inspect(runtime, &inv, container).await,
            Operation::Stats { .. } => handle_stats(runtime, &inv).await,
            Operation::Delete { container, force } => {
                handle_delete(runtime, &inv, container, *force).await
            }
        };

        match &result {
            Ok(_) => tracing::info!(operation = tool_name, "Operation succeeded"),
            Err(e) => tracing::warn!(operation = tool_name, error = %e, "Operation failed"),
        }
        result
    }
}

/// Command line for a validated operation
pub fn invocation(operation: &Operation) -> Invocation {
    match operation {
        Operation::Ps => Invocation::bounded(["ps", "--format", PS_FORMAT]),
        Operation::PsAll => Invocation::bounded(["ps", "-a", "--format", PS_FORMAT]),
        Operation::Port { container } => Invocation::bounded(["port", container.as_str()]),
        Operation::Logs { container, tail } => Invocation::bounded(vec![
            "logs".to_string(),
            "--tail".to_string(),
            tail.to_string(),
            container.to_string(),
        ]),
        Operation::Inspect { container } => Invocation::bounded(["inspect", container.as_str()]),
        Operation::Stats { no_stream: true } => Invocation::bounded(["stats", "--no-stream"]),
        Operation::Stats { no_stream: false } => Invocation::streaming(["stats"]),
        Operation::Images => Invocation::bounded(["images", "--format", IMAGES_FORMAT]),
        Operation::Delete { container, force } => {
            let mut args = vec!["rm"];
            if *force {
                args.push("-f");
            }
            args.push(container.as_str());
            Invocation::bounded(args)
        }
    }
}

/// Run an invocation, turning a non-zero exit into an execution failure
async fn run_checked(
    runtime: &dyn ContainerRuntime,
    invocation: &Invocation,
) -> Result<CommandOutput> {
    let output = runtime.run(invocation).await?;
    if output.success {
        return Ok(output);
    }

    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        format!(
            "docker {} exited with non-zero status (exit code: {:?})",
            invocation.args.first().map(String::as_str).unwrap_or_default(),
            output.exit_code
        )
    } else {
        stderr.to_string()
    };
    Err(Error::execution_failure(message))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle docker_ps, docker_ps_all and docker_images - tabular passthrough
async fn handle_listing(runtime: &dyn ContainerRuntime, inv: &Invocation) -> Result<String> {
    let output = run_checked(runtime, inv).await?;
    Ok(output.stdout)
}

/// Handle docker_port
async fn handle_port(runtime: &dyn ContainerRuntime, inv: &Invocation) -> Result<String> {
    let output = run_checked(runtime, inv).await?;
    if output.stdout.trim().is_empty() {
        Ok(NO_PORTS_MAPPED.to_string())
    } else {
        Ok(output.stdout)
    }
}

/// Handle docker_logs
///
/// The runtime replays the container's stderr stream on its own stderr, so
/// both streams are part of the log text.
async fn handle_logs(runtime: &dyn ContainerRuntime, inv: &Invocation) -> Result<String> {
    let output = run_checked(runtime, inv).await?;

    let mut text = output.stdout;
    if !output.stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&output.stderr);
    }
    Ok(text)
}

/// Handle docker_inspect - validate and pretty-print the JSON document
async fn handle_inspect(
    runtime: &dyn ContainerRuntime,
    inv: &Invocation,
    container: &ContainerId,
) -> Result<String> {
    let output = run_checked(runtime, inv).await?;

    let document: Value = serde_json::from_str(&output.stdout).map_err(|e| {
        Error::execution_failure(format!(
            "runtime returned invalid JSON for {}: {}",
            container, e
        ))
    })?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Handle docker_stats
async fn handle_stats(runtime: &dyn ContainerRuntime, inv: &Invocation) -> Result<String> {
    let output = run_checked(runtime, inv).await?;
    if output.terminated {
        tracing::info!(
            operation = OperationKind::Stats.name(),
            "Streaming statistics window closed"
        );
    }
    Ok(output.stdout)
}

/// Handle docker_delete
///
/// Deletion is irreversible, so a failure is reported as-is and never retried.
async fn handle_delete(
    runtime: &dyn ContainerRuntime,
    inv: &Invocation,
    container: &ContainerId,
    force: bool,
) -> Result<String> {
    run_checked(runtime, inv).await?;
    tracing::info!(container = %container, force, "Container removed");
    Ok(format!("Container '{}' deleted successfully", container))
}
