// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Storage server lifecycle.

use crate::error::{Result, RunError};
use crate::shell::{render, run_command, shell};
use async_trait::async_trait;
use iorgate_core::config::ServerConfig;
use std::time::Duration;
use tracing::info;

/// Starts and stops the storage servers a run is measured against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerControl: Send + Sync {
    /// Start servers on `hosts`.
    async fn start(&self, hosts: &[String]) -> Result<()>;

    /// Stop servers on `hosts`.
    async fn stop(&self, hosts: &[String]) -> Result<()>;
}

/// Server control through configured shell commands.
#[derive(Debug, Clone)]
pub struct ShellServerControl {
    group: String,
    start_command: String,
    stop_command: String,
    timeout: Duration,
}

impl ShellServerControl {
    /// Build from the `[server]` configuration section.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            group: config.group.clone(),
            start_command: config.start_command.clone(),
            stop_command: config.stop_command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn invoke(&self, template: &str, action: &str, hosts: &[String]) -> Result<()> {
        let hosts = hosts.join(",");
        let line = render(template, &[("group", self.group.as_str()), ("hosts", hosts.as_str())]);
        info!(group = %self.group, %hosts, action, "server lifecycle command");

        let output = run_command(shell(&line), &format!("server {action}"), self.timeout).await?;
        if !output.status.success() {
            return Err(RunError::Cluster(format!(
                "server {action} exited with {}: {}",
                output.status,
                output.stderr_tail()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ServerControl for ShellServerControl {
    async fn start(&self, hosts: &[String]) -> Result<()> {
        self.invoke(&self.start_command, "start", hosts).await
    }

    async fn stop(&self, hosts: &[String]) -> Result<()> {
        self.invoke(&self.stop_command, "stop", hosts).await
    }
}
