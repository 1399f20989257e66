//! Docker MCP Server
//!
//! A Model Context Protocol server that exposes container management
//! operations to agents by shelling out to the `docker` CLI.
//!
//! # Usage
//!
//! ```bash
//! docker-mcp [--config <file>] [--docker <path>] [--timeout <secs>] [--stream-duration <secs>]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `docker_mcp=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use std::path::PathBuf;

use clap::Parser;
use docker_mcp::{DockerMcpServer, ServerConfig};

/// MCP server for Docker container management
#[derive(Parser)]
#[command(name = "docker-mcp")]
#[command(about = "MCP server for Docker container management")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the docker client binary
    #[arg(long)]
    docker: Option<PathBuf>,

    /// Upper bound in seconds for a single docker command
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds of output captured from streaming stats
    #[arg(long)]
    stream_duration: Option<u64>,
}

impl Args {
    fn into_config(self) -> docker_mcp::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(docker) = self.docker {
            config.docker_binary = docker;
        }
        if let Some(timeout) = self.timeout {
            config.command_timeout_secs = timeout;
        }
        if let Some(duration) = self.stream_duration {
            config.stream_duration_secs = duration;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docker_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config()?;

    tracing::info!(
        docker = %config.docker_binary.display(),
        timeout_secs = config.command_timeout_secs,
        stream_secs = config.stream_duration_secs,
        "Starting docker-mcp server"
    );

    let mut server = DockerMcpServer::new(&config);
    server.run().await?;

    Ok(())
}
