//! External process execution
//!
//! The `CommandRunner` trait is the seam between the yt-dlp adapter and the OS.
//! Production code uses [`TokioCommandRunner`]; tests plug in scripted runners.
//! No timeout is applied here, the external tool enforces its own.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::core::error::{DomainError, DomainResult, ErrorCode};

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and captures its output.
    ///
    /// A non-zero exit is *not* an error here; only failing to run the
    /// program at all is, reported as `system-error / tool-crashed`.
    async fn run(&self, program: &str, args: &[String]) -> DomainResult<CommandOutput>;
}

/// Runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> DomainResult<CommandOutput> {
        log::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                log::error!("Failed to execute {}: {}", program, e);
                DomainError::new(ErrorCode::ToolCrashed, format!("Failed to execute {}: {}", program, e))
                    .with_context("program", program)
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
