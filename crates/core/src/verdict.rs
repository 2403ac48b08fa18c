// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Verdict engine.
//!
//! A run is judged on two independent axes:
//!
//! - **Regression**: a metric below its band's lower bound fails the run.
//!   Exactly one [`Outcome`] is produced.
//! - **Improvement**: a metric above its band's upper bound is recorded as an
//!   advisory note. It never fails a run and never hides a regression.

use crate::measurement::{BenchmarkMeasurement, Metric};
use crate::tolerance::ToleranceBand;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both metrics at or above their lower bounds.
    Pass,
    /// Write and read both below their lower bounds.
    RegressionBothFail,
    /// Only write below its lower bound.
    RegressionWriteFail,
    /// Only read below its lower bound.
    RegressionReadFail,
}

impl Outcome {
    /// Whether this outcome fails the run.
    pub fn is_regression(&self) -> bool {
        !matches!(self, Outcome::Pass)
    }

    /// Stable label for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::RegressionBothFail => "regression_both_fail",
            Outcome::RegressionWriteFail => "regression_write_fail",
            Outcome::RegressionReadFail => "regression_read_fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which metrics exceeded their upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Improvement {
    /// Write and read both above their upper bounds.
    BothAboveBand,
    /// Only write above its upper bound.
    WriteAboveBand,
    /// Only read above its upper bound.
    ReadAboveBand,
}

impl Improvement {
    /// Stable label for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Improvement::BothAboveBand => "both_above_band",
            Improvement::WriteAboveBand => "write_above_band",
            Improvement::ReadAboveBand => "read_above_band",
        }
    }
}

/// Distance of one metric from its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Metric concerned.
    pub metric: Metric,
    /// Expected value from the baseline.
    pub expected: f64,
    /// Measured value.
    pub measured: f64,
    /// Size of the gap in percent of `expected`, positive in the direction
    /// the deviation is reported (short of or above the baseline).
    pub percent: f64,
}

impl Deviation {
    fn shortfall(metric: Metric, band: &ToleranceBand, measured: f64) -> Self {
        Self {
            metric,
            expected: band.expected,
            measured,
            percent: (band.expected - measured) / band.expected * 100.0,
        }
    }

    fn excess(metric: Metric, band: &ToleranceBand, measured: f64) -> Self {
        Self {
            metric,
            expected: band.expected,
            measured,
            percent: (measured - band.expected) / band.expected * 100.0,
        }
    }

    fn describe(&self, direction: &str) -> String {
        format!(
            "mean {} bandwidth {:.2}% {} baseline (measured {:.2}, expected {:.2})",
            self.metric, self.percent, direction, self.measured, self.expected
        )
    }
}

/// Result of judging one measurement against its bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Pass or the specific regression.
    pub outcome: Outcome,
    /// Metrics above their upper bounds, if any.
    pub improvement: Option<Improvement>,
    /// One entry per metric below its lower bound.
    pub shortfalls: Vec<Deviation>,
    /// One entry per metric above its upper bound.
    pub excesses: Vec<Deviation>,
}

impl Verdict {
    /// Whether the run passed.
    pub fn is_pass(&self) -> bool {
        !self.outcome.is_regression()
    }

    /// Failure explanation, present for every regression outcome.
    pub fn message(&self) -> Option<String> {
        let lines: Vec<String> = self
            .shortfalls
            .iter()
            .map(|d| d.describe("below"))
            .collect();
        match self.outcome {
            Outcome::Pass => None,
            Outcome::RegressionBothFail => Some(format!(
                "mean bandwidth for both write and read is below its tolerance band\n{}",
                lines.join("\n")
            )),
            Outcome::RegressionWriteFail | Outcome::RegressionReadFail => Some(lines.join("\n")),
        }
    }

    /// Advisory notes, one per metric above its upper bound.
    pub fn improvement_notes(&self) -> Vec<String> {
        self.excesses.iter().map(|d| d.describe("above")).collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outcome)?;
        if let Some(message) = self.message() {
            write!(f, "\n{message}")?;
        }
        for note in self.improvement_notes() {
            write!(f, "\nnote: {note}")?;
        }
        Ok(())
    }
}

/// Classify a measurement against its write and read bands.
pub fn classify(
    measurement: &BenchmarkMeasurement,
    write_band: &ToleranceBand,
    read_band: &ToleranceBand,
) -> Verdict {
    let write = measurement.write_bandwidth;
    let read = measurement.read_bandwidth;

    let write_low = write_band.is_below(write);
    let read_low = read_band.is_below(read);
    let outcome = match (write_low, read_low) {
        (true, true) => Outcome::RegressionBothFail,
        (true, false) => Outcome::RegressionWriteFail,
        (false, true) => Outcome::RegressionReadFail,
        (false, false) => Outcome::Pass,
    };

    let mut shortfalls = Vec::new();
    if write_low {
        shortfalls.push(Deviation::shortfall(Metric::Write, write_band, write));
    }
    if read_low {
        shortfalls.push(Deviation::shortfall(Metric::Read, read_band, read));
    }

    let write_high = write_band.is_above(write);
    let read_high = read_band.is_above(read);
    let improvement = match (write_high, read_high) {
        (true, true) => Some(Improvement::BothAboveBand),
        (true, false) => Some(Improvement::WriteAboveBand),
        (false, true) => Some(Improvement::ReadAboveBand),
        (false, false) => None,
    };

    let mut excesses = Vec::new();
    if write_high {
        excesses.push(Deviation::excess(Metric::Write, write_band, write));
    }
    if read_high {
        excesses.push(Deviation::excess(Metric::Read, read_band, read));
    }

    Verdict {
        outcome,
        improvement,
        shortfalls,
        excesses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::compute_band;

    fn judge(write: f64, read: f64) -> Verdict {
        let write_band = compute_band(100.0, 10.0).unwrap();
        let read_band = compute_band(100.0, 10.0).unwrap();
        classify(&BenchmarkMeasurement::new(write, read), &write_band, &read_band)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_baseline_passes() {
        let verdict = judge(100.0, 100.0);
        assert_eq!(verdict.outcome, Outcome::Pass);
        assert!(verdict.message().is_none());
        assert!(verdict.improvement.is_none());
        assert!(verdict.improvement_notes().is_empty());
    }

    #[test]
    fn test_band_edges_pass() {
        assert_eq!(judge(90.0, 110.0).outcome, Outcome::Pass);
        assert_eq!(judge(110.0, 90.0).outcome, Outcome::Pass);
        assert!(judge(110.0, 110.0).improvement.is_none());
    }

    #[test]
    fn test_write_regression() {
        let verdict = judge(85.0, 98.0);
        assert_eq!(verdict.outcome, Outcome::RegressionWriteFail);
        assert_eq!(verdict.shortfalls.len(), 1);
        assert_eq!(verdict.shortfalls[0].metric, Metric::Write);
        assert!(close(verdict.shortfalls[0].percent, 15.0));

        let message = verdict.message().unwrap();
        assert!(message.contains("write"));
        assert!(message.contains("15.00% below"));
        assert!(!message.contains("read"));
    }

    #[test]
    fn test_read_regression() {
        let verdict = judge(100.0, 70.0);
        assert_eq!(verdict.outcome, Outcome::RegressionReadFail);
        let message = verdict.message().unwrap();
        assert!(message.contains("read"));
        assert!(message.contains("30.00% below"));
        assert!(!message.contains("write"));
    }

    #[test]
    fn test_both_regress_with_independent_percentages() {
        let write_band = compute_band(200.0, 10.0).unwrap();
        let read_band = compute_band(100.0, 10.0).unwrap();
        let verdict = classify(
            &BenchmarkMeasurement::new(150.0, 80.0),
            &write_band,
            &read_band,
        );
        assert_eq!(verdict.outcome, Outcome::RegressionBothFail);
        assert!(close(verdict.shortfalls[0].percent, 25.0));
        assert!(close(verdict.shortfalls[1].percent, 20.0));
        assert!(verdict.shortfalls.iter().all(|d| d.percent > 0.0));

        let message = verdict.message().unwrap();
        assert!(message.contains("both write and read"));
        assert!(message.contains("mean write bandwidth 25.00% below"));
        assert!(message.contains("mean read bandwidth 20.00% below"));
    }

    #[test]
    fn test_improvement_does_not_fail() {
        let verdict = judge(130.0, 102.0);
        assert_eq!(verdict.outcome, Outcome::Pass);
        assert_eq!(verdict.improvement, Some(Improvement::WriteAboveBand));
        assert_eq!(verdict.excesses.len(), 1);
        assert!(close(verdict.excesses[0].percent, 30.0));

        let notes = verdict.improvement_notes();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("mean write bandwidth 30.00% above"));
    }

    #[test]
    fn test_both_above_band() {
        let verdict = judge(120.0, 150.0);
        assert_eq!(verdict.outcome, Outcome::Pass);
        assert_eq!(verdict.improvement, Some(Improvement::BothAboveBand));
        assert_eq!(verdict.improvement_notes().len(), 2);
    }

    #[test]
    fn test_improvement_never_masks_regression() {
        let verdict = judge(50.0, 150.0);
        assert_eq!(verdict.outcome, Outcome::RegressionWriteFail);
        assert_eq!(verdict.improvement, Some(Improvement::ReadAboveBand));
        assert!(!verdict.is_pass());
        assert!(verdict.message().unwrap().contains("50.00% below"));
    }

    #[test]
    fn test_display_includes_message_and_notes() {
        let rendered = judge(85.0, 130.0).to_string();
        assert!(rendered.starts_with("regression_write_fail"));
        assert!(rendered.contains("note: mean read bandwidth 30.00% above"));
    }
}
