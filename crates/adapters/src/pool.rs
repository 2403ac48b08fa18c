// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Storage pool lifecycle.

use crate::error::{Result, RunError};
use crate::shell::{render, run_command, shell};
use async_trait::async_trait;
use iorgate_core::config::PoolConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("valid uuid pattern")
});

static SVC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:svcl|svc|service replicas|service ranks)\b[ \t]*[=:][ \t]*\[?([0-9][0-9,: \t]*)")
        .expect("valid service rank pattern")
});

/// A created pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolInfo {
    /// Pool UUID.
    pub uuid: Uuid,
    /// Ranks hosting the pool service, in reported order.
    pub svc_ranks: Vec<u32>,
}

impl PoolInfo {
    /// First `svcn` service ranks joined with `:`.
    pub fn svc_list(&self, svcn: u32) -> Result<String> {
        let svcn = svcn as usize;
        if svcn == 0 || self.svc_ranks.len() < svcn {
            return Err(RunError::Pool(format!(
                "pool {} reports {} service ranks, need {svcn}",
                self.uuid,
                self.svc_ranks.len()
            )));
        }
        Ok(self.svc_ranks[..svcn]
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(":"))
    }
}

/// Creates and destroys the pool a run writes into.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolControl: Send + Sync {
    /// Create the pool.
    async fn create(&self) -> Result<PoolInfo>;

    /// Destroy a pool created by [`PoolControl::create`].
    async fn destroy(&self, pool: &PoolInfo) -> Result<()>;
}

/// Pool control through configured shell commands.
#[derive(Debug, Clone)]
pub struct ShellPoolControl {
    config: PoolConfig,
    timeout: Duration,
}

impl ShellPoolControl {
    /// Build from the `[pool]` configuration section.
    pub fn from_config(config: &PoolConfig) -> Self {
        Self {
            config: config.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PoolControl for ShellPoolControl {
    async fn create(&self) -> Result<PoolInfo> {
        let mode = self.config.mode.to_string();
        let size = self.config.size.to_string();
        let svcn = self.config.svcn.to_string();
        let line = render(
            &self.config.create_command,
            &[
                ("mode", mode.as_str()),
                ("size", size.as_str()),
                ("setname", self.config.setname.as_str()),
                ("svcn", svcn.as_str()),
            ],
        );

        let output = run_command(shell(&line), "pool create", self.timeout).await?;
        if !output.status.success() {
            return Err(RunError::Pool(format!(
                "pool create exited with {}: {}",
                output.status,
                output.stderr_tail()
            )));
        }
        let pool = parse_create_output(&output.stdout)?;
        info!(pool = %pool.uuid, ranks = ?pool.svc_ranks, "pool created");
        Ok(pool)
    }

    async fn destroy(&self, pool: &PoolInfo) -> Result<()> {
        let uuid = pool.uuid.to_string();
        let line = render(
            &self.config.destroy_command,
            &[("uuid", uuid.as_str()), ("setname", self.config.setname.as_str())],
        );

        let output = run_command(shell(&line), "pool destroy", self.timeout).await?;
        if !output.status.success() {
            return Err(RunError::Pool(format!(
                "pool destroy {uuid} exited with {}: {}",
                output.status,
                output.stderr_tail()
            )));
        }
        info!(pool = %uuid, "pool destroyed");
        Ok(())
    }
}

/// Read the pool UUID and service ranks printed by a pool create command.
///
/// The first UUID in the output is the pool; service ranks follow an
/// `svc=`, `svcl=`, `Service replicas:` or `Service ranks:` label and are
/// separated by `,` or `:`.
pub fn parse_create_output(stdout: &str) -> Result<PoolInfo> {
    let uuid = UUID_RE
        .find(stdout)
        .and_then(|m| Uuid::parse_str(m.as_str()).ok())
        .ok_or_else(|| RunError::Pool(format!("no pool UUID in create output: {:?}", stdout.trim())))?;

    let ranks = SVC_RE
        .captures(stdout)
        .and_then(|c| c.get(1))
        .ok_or_else(|| RunError::Pool(format!("no service ranks in create output: {:?}", stdout.trim())))?;

    let svc_ranks = ranks
        .as_str()
        .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| RunError::Pool(format!("invalid service rank {s:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PoolInfo { uuid, svc_ranks })
}
