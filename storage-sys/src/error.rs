// SPDX-License-Identifier: GPL-3.0-only

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure modes of an external tool invocation
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout { .. })
    }
}

/// Result type alias for external tool invocations
pub type Result<T> = std::result::Result<T, CommandError>;
