// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while orchestrating a benchmark run.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while provisioning, running or validating a run.
///
/// None of these is a bandwidth regression; regressions are verdicts.
#[derive(Debug, Error)]
pub enum RunError {
    /// Server start or stop failed.
    #[error("server control failed: {0}")]
    Cluster(String),

    /// Pool create or destroy failed.
    #[error("pool operation failed: {0}")]
    Pool(String),

    /// Client host file could not be produced.
    #[error("host file error: {0}")]
    HostFile(String),

    /// Benchmark process exited unsuccessfully.
    #[error("benchmark exited with {status}: {stderr}")]
    BenchmarkFailed {
        /// Exit status description.
        status: String,
        /// Tail of the process's standard error.
        stderr: String,
    },

    /// An external command exceeded its time limit.
    #[error("{what} timed out after {after:?}")]
    Timeout {
        /// What was running.
        what: String,
        /// Limit that was exceeded.
        after: Duration,
    },

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or benchmark output rejected by the validator.
    #[error(transparent)]
    Validation(#[from] iorgate_core::Error),
}

impl RunError {
    /// Whether the benchmark output could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, RunError::Validation(e) if e.is_parse())
    }

    /// Whether the run configuration was rejected.
    pub fn is_config(&self) -> bool {
        matches!(self, RunError::Validation(iorgate_core::Error::InvalidConfig(_)))
    }
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, RunError>;
