//! Container runtime invocation
//!
//! [`ContainerRuntime`] is the seam between the handlers and the external
//! `docker` binary. [`DockerCli`] spawns the binary with an argument vector
//! (never through a shell) and captures its output.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::{Error, Result};

/// How long to wait for the output pipes after killing a streaming command
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How long an invocation is expected to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Runs to completion; exceeding the command timeout is a failure
    Bounded,
    /// Never exits on its own; output is captured for a fixed window
    Streaming,
}

/// A single runtime command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub mode: RunMode,
}

impl Invocation {
    pub fn bounded<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            mode: RunMode::Bounded,
        }
    }

    pub fn streaming<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            mode: RunMode::Streaming,
        }
    }
}

/// Captured result of a finished (or terminated) runtime process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Set when a streaming process was stopped at the end of its window
    pub terminated: bool,
}

impl CommandOutput {
    /// Output of a process that exited with status 0
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            success: true,
            ..Self::default()
        }
    }

    /// Output of a process that exited with a non-zero status
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
            ..Self::default()
        }
    }
}

/// Executes runtime command lines
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Run one invocation to completion
    ///
    /// Returns `Err` only when the process could not be run or exceeded its
    /// time limit; a non-zero exit is reported through [`CommandOutput`].
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs the `docker` command-line client
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
    command_timeout: Duration,
    stream_duration: Duration,
}

impl DockerCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let defaults = ServerConfig::default();
        Self {
            binary: binary.into(),
            command_timeout: defaults.command_timeout(),
            stream_duration: defaults.stream_duration(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            binary: config.docker_binary.clone(),
            command_timeout: config.command_timeout(),
            stream_duration: config.stream_duration(),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_stream_duration(mut self, duration: Duration) -> Self {
        self.stream_duration = duration;
        self
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so termination reaches any helpers the client forks
        #[cfg(unix)]
        cmd.process_group(0);

        cmd.spawn().map_err(|e| {
            Error::execution_failure(format!(
                "failed to start {}: {}",
                self.binary.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        tracing::debug!(
            binary = %self.binary.display(),
            args = ?invocation.args,
            mode = ?invocation.mode,
            "Spawning runtime command"
        );

        let mut child = self.spawn(invocation)?;
        let mut stdout_task = collect(child.stdout.take());
        let mut stderr_task = collect(child.stderr.take());

        let limit = match invocation.mode {
            RunMode::Bounded => self.command_timeout,
            RunMode::Streaming => self.stream_duration,
        };

        // The limit covers the readers too: a process left behind by the
        // runtime can hold the pipes open after the runtime itself exits.
        let completed = tokio::time::timeout(limit, async {
            let status = child.wait().await?;
            let stdout = join_output(&mut stdout_task).await?;
            let stderr = join_output(&mut stderr_task).await?;
            Ok::<_, Error>((status, stdout, stderr))
        })
        .await;

        if let Ok(result) = completed {
            let (status, stdout, stderr) = result?;
            return Ok(finished(status, stdout, stderr));
        }

        terminate(&mut child).await;

        if invocation.mode == RunMode::Bounded {
            stdout_task.abort();
            stderr_task.abort();
            tracing::warn!(
                args = ?invocation.args,
                timeout_secs = limit.as_secs(),
                "Runtime command timed out"
            );
            return Err(Error::execution_failure(format!(
                "docker {} timed out after {}s",
                invocation.args.join(" "),
                limit.as_secs()
            )));
        }

        let stdout = drain_output(stdout_task).await;
        let stderr = drain_output(stderr_task).await;
        tracing::debug!(
            window_secs = limit.as_secs(),
            "Stopped streaming runtime command"
        );
        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: None,
            success: true,
            terminated: true,
        })
    }
}

fn finished(status: ExitStatus, stdout: String, stderr: String) -> CommandOutput {
    CommandOutput {
        stdout,
        stderr,
        exit_code: status.code(),
        success: status.success(),
        terminated: false,
    }
}

fn collect<R>(reader: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            reader.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn join_output(task: &mut JoinHandle<std::io::Result<Vec<u8>>>) -> Result<String> {
    let bytes = task
        .await
        .map_err(|e| Error::execution_failure(format!("output reader failed: {}", e)))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Output captured before a streaming window closed
///
/// The group has been killed, so the pipes normally close at once. A reader
/// still blocked after the grace period is aborted and yields nothing.
async fn drain_output(mut task: JoinHandle<std::io::Result<Vec<u8>>>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, join_output(&mut task)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Discarding streaming output");
            String::new()
        }
        Err(_) => {
            task.abort();
            tracing::debug!("Output pipe still open after kill");
            String::new()
        }
    }
}

/// Kill the child's whole process group, then reap the child
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: killpg has no memory-safety preconditions; the group id is
        // the pid of a child spawned with `process_group(0)`.
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc != 0 {
            tracing::debug!(pid, error = %std::io::Error::last_os_error(), "killpg failed");
        }
    }

    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "Child already exited");
    }
}
