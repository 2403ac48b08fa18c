// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cluster collaborators and run orchestration for iorgate.
//!
//! The core crate judges benchmark output; this crate produces it. Each
//! external system sits behind a trait so the [`orchestrator`] can be
//! exercised without a cluster:
//!
//! - [`cluster::ServerControl`] - start and stop the storage servers
//! - [`pool::PoolControl`] - create and destroy the pool under test
//! - [`ior::BenchmarkLauncher`] - run the benchmark and capture its output
//!
//! The shell-backed implementations run configured command templates.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod hostfile;
pub mod ior;
pub mod orchestrator;
pub mod pool;
pub mod shell;

pub use cluster::{ServerControl, ShellServerControl};
pub use error::{Result, RunError};
pub use ior::{BenchmarkLauncher, IorInvocation, ProcessLauncher};
pub use orchestrator::{judge, Orchestrator, RunOutcome, RunReport, TestStatus};
pub use pool::{PoolControl, PoolInfo, ShellPoolControl};
