// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! IOR invocation and output capture.
//!
//! The benchmark is launched across the client host file by an MPI launcher.
//! Its standard output is written to a log file and returned as text; the
//! caller hands that text to the validator.

use crate::error::{Result, RunError};
use crate::shell::run_command;
use async_trait::async_trait;
use iorgate_core::config::IorConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

/// A fully resolved benchmark command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IorInvocation {
    /// Launcher executable.
    pub program: String,
    /// Launcher arguments, including the benchmark and its options.
    pub args: Vec<String>,
    /// File that receives the benchmark's standard output.
    pub log_path: PathBuf,
    /// Process-level timeout.
    pub timeout: Duration,
}

impl IorInvocation {
    /// Resolve the benchmark command for a pool.
    pub fn build(
        ior: &IorConfig,
        hostfile: &Path,
        pool: &Uuid,
        svc_list: &str,
        log_path: PathBuf,
    ) -> Result<Self> {
        let block_size = ior.block_size()?;
        let transfer_size = ior.transfer_size()?;

        let mut args = vec![
            "-N".to_string(),
            ior.slots.to_string(),
            "--hostfile".to_string(),
            hostfile.display().to_string(),
            ior.binary.clone(),
        ];
        args.extend(ior.flags.split_whitespace().map(str::to_string));
        args.extend([
            "-i".to_string(),
            ior.iterations.to_string(),
            "-a".to_string(),
            "DAOS".to_string(),
            "-b".to_string(),
            block_size,
            "-t".to_string(),
            transfer_size,
            "--".to_string(),
            "-p".to_string(),
            pool.to_string(),
            "-v".to_string(),
            svc_list.to_string(),
            "-r".to_string(),
            ior.record_size.clone(),
            "-s".to_string(),
            ior.stripe_size.clone(),
            "-c".to_string(),
            ior.stripe_count.to_string(),
            "-a".to_string(),
            ior.async_io.to_string(),
            "-o".to_string(),
            ior.object_class.clone(),
        ]);

        Ok(Self {
            program: ior.launcher.clone(),
            args,
            log_path,
            timeout: Duration::from_secs(ior.timeout_secs),
        })
    }

    /// Command line for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs the benchmark and returns its captured standard output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BenchmarkLauncher: Send + Sync {
    /// Run `invocation` to completion.
    async fn run(&self, invocation: &IorInvocation) -> Result<String>;
}

/// Launches the benchmark as a child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl BenchmarkLauncher for ProcessLauncher {
    async fn run(&self, invocation: &IorInvocation) -> Result<String> {
        info!(command = %invocation.command_line(), "launching benchmark");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        let output = run_command(command, "benchmark", invocation.timeout).await?;

        if let Some(parent) = invocation.log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&invocation.log_path, &output.stdout).await?;

        if !output.status.success() {
            warn!(status = %output.status, log = %invocation.log_path.display(), "benchmark failed");
            return Err(RunError::BenchmarkFailed {
                status: output.status.to_string(),
                stderr: output.stderr_tail(),
            });
        }

        info!(log = %invocation.log_path.display(), bytes = output.stdout.len(), "benchmark output captured");
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ior_config() -> IorConfig {
        IorConfig {
            launcher: "orterun".to_string(),
            binary: "/opt/daos/bin/ior".to_string(),
            flags: "-w -r -k".to_string(),
            iterations: 3,
            transfer_size: "1m".to_string(),
            record_size: "1k".to_string(),
            stripe_size: "8m".to_string(),
            stripe_count: 1024,
            async_io: 16,
            object_class: "LARGE".to_string(),
            slots: 8,
            block_size: None,
            timeout_secs: 120,
        }
    }

    fn pool() -> Uuid {
        Uuid::parse_str("4bd1b3a4-1b4c-4b1e-9c43-2c9ad2b8f0aa").unwrap()
    }

    #[test]
    fn test_build_command() {
        let invocation = IorInvocation::build(
            &ior_config(),
            Path::new("/tmp/hostfile"),
            &pool(),
            "0:1",
            PathBuf::from("/tmp/ior.stdout"),
        )
        .unwrap();

        assert_eq!(invocation.program, "orterun");
        assert_eq!(invocation.timeout, Duration::from_secs(120));
        assert_eq!(
            invocation.command_line(),
            "orterun -N 8 --hostfile /tmp/hostfile /opt/daos/bin/ior -w -r -k -i 3 -a DAOS \
             -b 3g -t 8m -- -p 4bd1b3a4-1b4c-4b1e-9c43-2c9ad2b8f0aa -v 0:1 -r 1k -s 8m \
             -c 1024 -a 16 -o LARGE"
        );
    }

    #[test]
    fn test_build_rejects_underivable_block_size() {
        let mut ior = ior_config();
        ior.slots = 7;
        let err = IorInvocation::build(&ior, Path::new("h"), &pool(), "0", PathBuf::from("l"))
            .unwrap_err();
        assert!(matches!(err, RunError::Validation(_)));
    }

    fn script_invocation(dir: &Path, script: &str) -> IorInvocation {
        IorInvocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            log_path: dir.join("logs/ior.stdout"),
            timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_process_launcher_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = script_invocation(dir.path(), "echo 'Summary of all tests:'");
        let stdout = ProcessLauncher.run(&invocation).await.unwrap();
        assert_eq!(stdout.trim(), "Summary of all tests:");
        let logged = std::fs::read_to_string(&invocation.log_path).unwrap();
        assert_eq!(logged, stdout);
    }

    #[tokio::test]
    async fn test_process_launcher_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = script_invocation(dir.path(), "echo partial; echo 'MPI abort' >&2; exit 2");
        let err = ProcessLauncher.run(&invocation).await.unwrap_err();
        match err {
            RunError::BenchmarkFailed { stderr, .. } => assert_eq!(stderr, "MPI abort"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(invocation.log_path.exists());
    }
}
