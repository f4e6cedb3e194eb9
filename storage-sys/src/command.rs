// SPDX-License-Identifier: GPL-3.0-only

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CommandError, Result};

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools on behalf of the quota probe and the scanner.
///
/// Every call is bounded by `timeout`; a child that outlives it is killed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput>;
}

/// Runs tools found on `PATH` as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let resolved =
            which::which(program).map_err(|_| CommandError::NotFound(program.to_string()))?;

        let child = Command::new(&resolved)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it;
        // tokio reaps the zombie in the background.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Command line as it would be typed, for log messages.
pub fn render(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
