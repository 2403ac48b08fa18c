//! Benchmark result types.
//!
//! This module provides the canonical BenchmarkResult record written for
//! every validated run.

use chrono::{DateTime, Utc};
use iorgate_core::{Validation, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Canonical record of one validated benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Test id the run was validated under.
    pub target_id: String,
    /// Measurement, bands and verdict in JSON form.
    pub metrics: serde_json::Value,
    /// Timestamp when the result was recorded.
    pub timestamp: DateTime<Utc>,
}

impl BenchmarkResult {
    /// Create a new BenchmarkResult.
    pub fn new(target_id: impl Into<String>, metrics: serde_json::Value) -> Self {
        Self {
            target_id: target_id.into(),
            metrics,
            timestamp: Utc::now(),
        }
    }

    /// Record a completed validation.
    pub fn from_validation(target_id: impl Into<String>, validation: &Validation) -> Self {
        let verdict: &Verdict = &validation.verdict;
        Self::new(
            target_id,
            json!({
                "write_bandwidth": validation.measurement.write_bandwidth,
                "read_bandwidth": validation.measurement.read_bandwidth,
                "write_band": validation.write_band,
                "read_band": validation.read_band,
                "outcome": verdict.outcome.as_str(),
                "improvement": verdict.improvement.map(|i| i.as_str()),
                "message": verdict.message(),
                "notes": verdict.improvement_notes(),
            }),
        )
    }

    /// Record a run that ended without a verdict.
    pub fn from_error(target_id: impl Into<String>, error: impl ToString) -> Self {
        Self::new(
            target_id,
            json!({
                "outcome": "error",
                "message": error.to_string(),
            }),
        )
    }

    /// Mark whether the run satisfied its expected outcome.
    pub fn with_status(mut self, passed: bool) -> Self {
        if let Some(metrics) = self.metrics.as_object_mut() {
            metrics.insert("passed".to_string(), json!(passed));
        }
        self
    }

    /// Outcome label, if recorded.
    pub fn outcome(&self) -> Option<&str> {
        self.metrics.get("outcome").and_then(|v| v.as_str())
    }

    /// Failure message, if recorded.
    pub fn message(&self) -> Option<&str> {
        self.metrics.get("message").and_then(|v| v.as_str())
    }

    /// Whether the run satisfied its expectation, if recorded.
    pub fn passed(&self) -> Option<bool> {
        self.metrics.get("passed").and_then(|v| v.as_bool())
    }
}
