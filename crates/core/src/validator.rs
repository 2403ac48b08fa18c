// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! One-call validation of a benchmark log against a baseline.

use crate::error::Result;
use crate::measurement::{BenchmarkMeasurement, Metric};
use crate::summary::SummaryLayout;
use crate::tolerance::{Baseline, ComparisonMode, ToleranceBand};
use crate::verdict::{classify, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything derived while validating one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// Measurement as compared; truncated in [`ComparisonMode::Truncated`].
    pub measurement: BenchmarkMeasurement,
    /// Write tolerance band.
    pub write_band: ToleranceBand,
    /// Read tolerance band.
    pub read_band: ToleranceBand,
    /// Resulting verdict.
    pub verdict: Verdict,
}

/// Extracts, bands and classifies in one place.
#[derive(Debug, Clone)]
pub struct Validator {
    baseline: Baseline,
    mode: ComparisonMode,
    layout: SummaryLayout,
}

impl Validator {
    /// Validator with float comparison and the default summary layout.
    pub fn new(baseline: Baseline) -> Self {
        Self {
            baseline,
            mode: ComparisonMode::default(),
            layout: SummaryLayout::default(),
        }
    }

    /// Set the comparison mode.
    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the summary layout.
    pub fn with_layout(mut self, layout: SummaryLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Write and read tolerance bands.
    pub fn bands(&self) -> Result<(ToleranceBand, ToleranceBand)> {
        Ok((
            self.baseline.band(Metric::Write, self.mode)?,
            self.baseline.band(Metric::Read, self.mode)?,
        ))
    }

    /// Judge an already extracted measurement.
    pub fn judge(&self, measurement: BenchmarkMeasurement) -> Result<Validation> {
        let (write_band, read_band) = self.bands()?;
        let measurement = match self.mode {
            ComparisonMode::Float => measurement,
            ComparisonMode::Truncated => measurement.truncated(),
        };
        let verdict = classify(&measurement, &write_band, &read_band);

        info!(
            write_bw = measurement.write_bandwidth,
            read_bw = measurement.read_bandwidth,
            write_low = write_band.low,
            read_low = read_band.low,
            outcome = %verdict.outcome,
            "benchmark run classified"
        );

        Ok(Validation {
            measurement,
            write_band,
            read_band,
            verdict,
        })
    }

    /// Extract the summary from raw benchmark output and judge it.
    pub fn validate(&self, text: &str) -> Result<Validation> {
        // Baseline errors take precedence over parse errors.
        self.bands()?;
        let measurement = self.layout.extract(text)?;
        debug!(
            write_bw = measurement.write_bandwidth,
            read_bw = measurement.read_bandwidth,
            "summary block extracted"
        );
        self.judge(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::verdict::{Improvement, Outcome};

    fn log(write: &str, read: &str) -> String {
        format!(
            "IOR output\nSummary of all tests:\nOperation Max Min Mean\n--------- --- --- ----\nwrite 0 0 {write} 0\nread 0 0 {read} 0\nFinished\n"
        )
    }

    fn validator() -> Validator {
        Validator::new(Baseline::new(100.0, 100.0, 10.0).unwrap())
    }

    #[test]
    fn test_write_regression_end_to_end() {
        let validation = validator().validate(&log("85", "98")).unwrap();
        assert_eq!(validation.verdict.outcome, Outcome::RegressionWriteFail);
        assert!(validation.verdict.message().unwrap().contains("write bandwidth 15.00% below"));
        assert_eq!(validation.write_band.low, 90.0);
    }

    #[test]
    fn test_improvement_end_to_end() {
        let validation = validator().validate(&log("130", "102")).unwrap();
        assert_eq!(validation.verdict.outcome, Outcome::Pass);
        assert_eq!(validation.verdict.improvement, Some(Improvement::WriteAboveBand));
        assert!(validation.verdict.improvement_notes()[0].contains("30.00% above"));
    }

    #[test]
    fn test_parse_failure_is_not_a_regression() {
        let err = validator().validate("benchmark crashed\n").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_truncated_mode_truncates_measurement() {
        let validator = validator().with_mode(ComparisonMode::Truncated);
        let validation = validator.validate(&log("90.7", "100")).unwrap();
        assert_eq!(validation.measurement.write_bandwidth, 90.0);
        assert_eq!(validation.verdict.outcome, Outcome::Pass);

        let validation = validator.validate(&log("89.9", "100")).unwrap();
        assert_eq!(validation.verdict.outcome, Outcome::RegressionWriteFail);
    }

    #[test]
    fn test_custom_layout_is_used() {
        let layout = SummaryLayout {
            marker: "RESULTS".to_string(),
            write_row: 0,
            read_row: 1,
            mean_column: 1,
        };
        let validator = validator().with_layout(layout);
        let validation = validator.validate("RESULTS\nwrite 95\nread 105\n").unwrap();
        assert!(validation.verdict.is_pass());
    }

    #[test]
    fn test_bands_reflect_baseline() {
        let validator = Validator::new(Baseline::new(1000.0, 500.0, 5.0).unwrap());
        let (write, read) = validator.bands().unwrap();
        assert_eq!((write.low, write.high), (950.0, 1050.0));
        assert_eq!((read.low, read.high), (475.0, 525.0));
        assert!(matches!(
            Baseline::new(1000.0, 500.0, -5.0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
