// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark run orchestration.
//!
//! Sequences one validation run:
//!
//! ```text
//! validate config ─▶ start servers ─▶ create pool ─▶ host file ─▶ benchmark
//!                                                                   │
//!            stop servers ◀─ destroy pool ◀─ verdict ◀─ validator ◀─┘
//! ```
//!
//! Configuration is checked before any collaborator is touched. Once the
//! servers have been asked to start, the pool (if created) is destroyed and
//! the servers are stopped on every exit path. Cleanup failures are logged
//! and reported alongside the primary outcome; they never replace it.

use crate::cluster::{ServerControl, ShellServerControl};
use crate::error::{Result, RunError};
use crate::hostfile::write_hostfile;
use crate::ior::{BenchmarkLauncher, IorInvocation, ProcessLauncher};
use crate::pool::{PoolControl, PoolInfo, ShellPoolControl};
use iorgate_core::{ExpectedOutcome, RunConfig, Validation, Validator};
use std::sync::Arc;
use tracing::{error, info, warn};

/// How the run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The benchmark ran and its output was classified.
    Completed(Validation),
    /// The run stopped before a verdict.
    Errored(RunError),
}

/// Whether the run met its expected outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// Expectation met.
    Passed,
    /// Expectation not met, with the reason.
    Failed(String),
}

impl TestStatus {
    /// Whether the expectation was met.
    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

/// Result of one orchestrated run.
#[derive(Debug)]
pub struct RunReport {
    /// Test id the run was validated under.
    pub test_id: String,
    /// Verdict or error.
    pub outcome: RunOutcome,
    /// Expected outcome compared against `outcome`.
    pub status: TestStatus,
    /// Teardown steps that failed.
    pub cleanup_errors: Vec<String>,
}

/// Compare a run's outcome with what the configuration expects.
///
/// A run expected to pass passes only on a passing verdict, and a regression
/// fails it with the verdict's message. A run expected to fail is satisfied
/// by a regression or by an error that kept it from producing a verdict,
/// but never by a rejected configuration.
pub fn judge(expected: ExpectedOutcome, outcome: &RunOutcome) -> TestStatus {
    match (expected, outcome) {
        (ExpectedOutcome::Pass, RunOutcome::Completed(v)) => match v.verdict.message() {
            None => TestStatus::Passed,
            Some(message) => TestStatus::Failed(message),
        },
        (ExpectedOutcome::Pass, RunOutcome::Errored(e)) => {
            TestStatus::Failed(format!("run was expected to pass but failed: {e}"))
        }
        (ExpectedOutcome::Fail, RunOutcome::Errored(e)) if e.is_config() => {
            TestStatus::Failed(format!("run could not start: {e}"))
        }
        (ExpectedOutcome::Fail, RunOutcome::Completed(v)) if v.verdict.is_pass() => {
            TestStatus::Failed("run was expected to fail but it passed".to_string())
        }
        (ExpectedOutcome::Fail, _) => TestStatus::Passed,
    }
}

/// Drives servers, pool and benchmark for one validation run.
pub struct Orchestrator {
    servers: Arc<dyn ServerControl>,
    pools: Arc<dyn PoolControl>,
    launcher: Arc<dyn BenchmarkLauncher>,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators.
    pub fn new(
        servers: Arc<dyn ServerControl>,
        pools: Arc<dyn PoolControl>,
        launcher: Arc<dyn BenchmarkLauncher>,
    ) -> Self {
        Self {
            servers,
            pools,
            launcher,
        }
    }

    /// Orchestrator backed by configured shell commands and a child process
    /// benchmark launcher.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            Arc::new(ShellServerControl::from_config(&config.server)),
            Arc::new(ShellPoolControl::from_config(&config.pool)),
            Arc::new(ProcessLauncher),
        )
    }

    /// Run and validate the benchmark for `test_id`.
    pub async fn run(&self, config: &RunConfig, test_id: &str) -> RunReport {
        let expected = config.validation.expected_outcome;
        info!(test_id, ?expected, "starting benchmark validation run");

        let validator = match config
            .validate(test_id)
            .and_then(|()| config.validator(test_id))
        {
            Ok(validator) => validator,
            Err(e) => {
                error!(test_id, error = %e, "configuration rejected");
                return report(test_id, expected, RunOutcome::Errored(e.into()), Vec::new());
            }
        };

        let mut cleanup_errors = Vec::new();
        let hosts = &config.server.hosts;

        let outcome = match self.servers.start(hosts).await {
            Err(e) => RunOutcome::Errored(e),
            Ok(()) => {
                let mut pool = None;
                let result = self.execute(config, test_id, &validator, &mut pool).await;
                if let Some(pool) = pool {
                    if let Err(e) = self.pools.destroy(&pool).await {
                        warn!(test_id, pool = %pool.uuid, error = %e, "pool cleanup failed");
                        cleanup_errors.push(format!("destroy pool {}: {e}", pool.uuid));
                    }
                }
                match result {
                    Ok(validation) => RunOutcome::Completed(validation),
                    Err(e) => RunOutcome::Errored(e),
                }
            }
        };

        if let Err(e) = self.servers.stop(hosts).await {
            warn!(test_id, error = %e, "server shutdown failed");
            cleanup_errors.push(format!("stop servers: {e}"));
        }

        report(test_id, expected, outcome, cleanup_errors)
    }

    async fn execute(
        &self,
        config: &RunConfig,
        test_id: &str,
        validator: &Validator,
        pool: &mut Option<PoolInfo>,
    ) -> Result<Validation> {
        let created = pool.insert(self.pools.create().await?);
        info!(test_id, pool = %created.uuid, "pool ready");
        let svc_list = created.svc_list(config.pool.svcn)?;
        let uuid = created.uuid;

        let hostfile = write_hostfile(
            &config.workdir.join(format!("hostfile-{test_id}")),
            &config.clients.hosts,
            config.ior.slots,
        )
        .await?;

        let invocation = IorInvocation::build(
            &config.ior,
            &hostfile,
            &uuid,
            &svc_list,
            config.workdir.join(format!("ior-{test_id}.stdout")),
        )?;
        let output = self.launcher.run(&invocation).await?;

        Ok(validator.validate(&output)?)
    }
}

fn report(
    test_id: &str,
    expected: ExpectedOutcome,
    outcome: RunOutcome,
    cleanup_errors: Vec<String>,
) -> RunReport {
    let status = judge(expected, &outcome);
    match &status {
        TestStatus::Passed => info!(test_id, "run met its expected outcome"),
        TestStatus::Failed(reason) => warn!(test_id, %reason, "run did not meet its expected outcome"),
    }
    RunReport {
        test_id: test_id.to_string(),
        outcome,
        status,
        cleanup_errors,
    }
}
