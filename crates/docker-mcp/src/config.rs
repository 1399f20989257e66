//! Server configuration
//!
//! Settings are read from an optional TOML file and then overridden by
//! command-line flags:
//!
//! ```toml
//! docker_binary = "docker"
//! command_timeout_secs = 120
//! stream_duration_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_docker_binary() -> PathBuf {
    PathBuf::from("docker")
}

fn default_command_timeout_secs() -> u64 {
    120
}

fn default_stream_duration_secs() -> u64 {
    10
}

/// Runtime settings for the MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Path or name (resolved via `PATH`) of the container runtime client
    #[serde(default = "default_docker_binary")]
    pub docker_binary: PathBuf,

    /// Upper bound on the duration of a single runtime command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// How long streaming statistics are captured before the process is stopped
    #[serde(default = "default_stream_duration_secs")]
    pub stream_duration_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            docker_binary: default_docker_binary(),
            command_timeout_secs: default_command_timeout_secs(),
            stream_duration_secs: default_stream_duration_secs(),
        }
    }
}

impl ServerConfig {
    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.docker_binary.as_os_str().is_empty() {
            return Err(Error::Config("docker_binary must not be empty".to_string()));
        }
        if self.command_timeout_secs == 0 {
            return Err(Error::Config(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.stream_duration_secs == 0 {
            return Err(Error::Config(
                "stream_duration_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn stream_duration(&self) -> Duration {
        Duration::from_secs(self.stream_duration_secs)
    }
}
