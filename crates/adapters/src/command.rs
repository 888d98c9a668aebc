// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subprocess execution for scheduler queries.

use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default bound on a single scheduler query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors running an external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with {status}: {stderr}")]
    Failed { program: String, status: String, stderr: String },
}

/// Run `cmd` to completion, killing it if it outlives `timeout`.
///
/// A non-zero exit status is reported as [`CommandError::Failed`] with the
/// trimmed stderr.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    program: &str,
) -> Result<Output, CommandError> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|source| CommandError::Spawn { program: program.to_string(), source })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => {
            result.map_err(|source| CommandError::Spawn { program: program.to_string(), source })?
        }
        Err(_) => {
            return Err(CommandError::Timeout { program: program.to_string(), timeout });
        }
    };

    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::debug!(program, bytes = output.stdout.len(), "command finished");
    Ok(output)
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
