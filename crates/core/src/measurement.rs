// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Measured bandwidth of one benchmark run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two bandwidth metrics a run is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean write bandwidth.
    Write,
    /// Mean read bandwidth.
    Read,
}

impl Metric {
    /// Lowercase metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Write => "write",
            Metric::Read => "read",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean write and read bandwidth extracted from one run's summary block.
///
/// Units are whatever the benchmark reports; they must match the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMeasurement {
    /// Mean write bandwidth.
    pub write_bandwidth: f64,
    /// Mean read bandwidth.
    pub read_bandwidth: f64,
}

impl BenchmarkMeasurement {
    /// Create a measurement.
    pub fn new(write_bandwidth: f64, read_bandwidth: f64) -> Self {
        Self {
            write_bandwidth,
            read_bandwidth,
        }
    }

    /// Copy with both values truncated toward zero.
    pub fn truncated(&self) -> Self {
        Self::new(self.write_bandwidth.trunc(), self.read_bandwidth.trunc())
    }
}
