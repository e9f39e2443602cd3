//! External command execution.
//!
//! Every probe and remediation that touches the operating system goes
//! through [`CommandRunner`], so tests can script command output without
//! spawning processes.
//!
//! A command that times out, or cannot be spawned at all, produces
//! [`CommandOutput::failed`]: empty stdout and an unsuccessful status. Callers
//! never see an error from a probe command.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Captured stdout (lossy UTF-8)
    pub stdout: String,
    /// Set when the hard timeout elapsed and the child was killed
    pub timed_out: bool,
}

impl CommandOutput {
    /// Successful exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            timed_out: false,
        }
    }

    /// Unsuccessful exit with no output.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Timed out; treated exactly like a failure with no output.
    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }
}

/// Runs external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, capturing stdout.
    ///
    /// With `limit` set, the child is killed once it elapses and
    /// [`CommandOutput::timed_out`] is returned. Without it the call waits
    /// for the process to exit on its own.
    async fn run(&self, program: &str, args: &[String], limit: Option<Duration>) -> CommandOutput;
}

/// Runs commands on the host via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String], limit: Option<Duration>) -> CommandOutput {
        debug!(program, ?args, ?limit, "Running command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(program, error = %e, "Failed to spawn command");
                return CommandOutput::failed();
            }
        };

        let output = match limit {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(program, timeout_secs = limit.as_secs_f64(), "Command timed out");
                    return CommandOutput::timed_out();
                }
            },
            None => child.wait_with_output().await,
        };

        match output {
            Ok(output) => {
                debug!(program, status = %output.status, "Command finished");
                CommandOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    timed_out: false,
                }
            }
            Err(e) => {
                warn!(program, error = %e, "Command failed while waiting for output");
                CommandOutput::failed()
            }
        }
    }
}

/// Build an owned argument list.
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
