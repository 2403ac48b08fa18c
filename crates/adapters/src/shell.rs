// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! External command execution with a process-level timeout.

use crate::error::{Result, RunError};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr tail kept in error messages.
const STDERR_TAIL: usize = 2048;

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit status.
    pub status: ExitStatus,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Last part of stderr, trimmed.
    pub fn stderr_tail(&self) -> String {
        let stderr = self.stderr.trim();
        match stderr.char_indices().rev().nth(STDERR_TAIL) {
            Some((idx, _)) => format!("...{}", &stderr[idx..]),
            None => stderr.to_string(),
        }
    }
}

/// Substitute `{name}` placeholders in a command template.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

/// Build a `sh -c` command for a rendered command line.
pub fn shell(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

/// Run a command to completion, killing it if `timeout` elapses.
pub async fn run_command(mut command: Command, what: &str, timeout: Duration) -> Result<CommandOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(what, ?command, "spawning command");
    let child = command.spawn()?;
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| RunError::Timeout {
            what: what.to_string(),
            after: timeout,
        })??;

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
