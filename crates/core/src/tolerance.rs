// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Baselines and the tolerance bands derived from them.

use crate::error::{Error, Result};
use crate::measurement::Metric;
use serde::{Deserialize, Serialize};

/// Numeric domain used when comparing a measurement against its band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Compare floats as measured.
    #[default]
    Float,
    /// Truncate baseline, bounds and measurement toward zero before comparing.
    ///
    /// Reproduces integer comparisons used by older harnesses.
    Truncated,
}

/// Historically expected bandwidth for one benchmark configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Expected mean write bandwidth.
    pub expected_write: f64,
    /// Expected mean read bandwidth.
    pub expected_read: f64,
    /// Symmetric tolerance, in percent of the expected value.
    pub deviation_percent: f64,
}

impl Baseline {
    /// Create a baseline, rejecting non-positive expectations and negative
    /// deviation.
    pub fn new(expected_write: f64, expected_read: f64, deviation_percent: f64) -> Result<Self> {
        check_expected(Metric::Write, expected_write)?;
        check_expected(Metric::Read, expected_read)?;
        check_deviation(deviation_percent)?;
        Ok(Self {
            expected_write,
            expected_read,
            deviation_percent,
        })
    }

    /// Expected value for a metric.
    pub fn expected(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Write => self.expected_write,
            Metric::Read => self.expected_read,
        }
    }

    /// Tolerance band for a metric.
    pub fn band(&self, metric: Metric, mode: ComparisonMode) -> Result<ToleranceBand> {
        compute_band_with_mode(self.expected(metric), self.deviation_percent, mode)
    }
}

/// Acceptable `[low, high]` interval around an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    /// Expected value the band is centred on.
    pub expected: f64,
    /// Deviation the band was built with.
    pub deviation_percent: f64,
    /// Lower bound. Values strictly below it are regressions.
    pub low: f64,
    /// Upper bound. Values strictly above it are improvements.
    pub high: f64,
}

impl ToleranceBand {
    /// Whether `value` falls short of the band.
    pub fn is_below(&self, value: f64) -> bool {
        value < self.low
    }

    /// Whether `value` exceeds the band.
    pub fn is_above(&self, value: f64) -> bool {
        value > self.high
    }
}

/// Compute the float tolerance band for `expected` at `deviation_percent`.
pub fn compute_band(expected: f64, deviation_percent: f64) -> Result<ToleranceBand> {
    compute_band_with_mode(expected, deviation_percent, ComparisonMode::Float)
}

/// Compute the tolerance band in the given comparison mode.
pub fn compute_band_with_mode(
    expected: f64,
    deviation_percent: f64,
    mode: ComparisonMode,
) -> Result<ToleranceBand> {
    check_deviation(deviation_percent)?;
    if !expected.is_finite() {
        return Err(Error::invalid_config(format!(
            "baseline must be a finite number, got {expected}"
        )));
    }

    let band = match mode {
        ComparisonMode::Float => {
            let delta = expected * deviation_percent / 100.0;
            ToleranceBand {
                expected,
                deviation_percent,
                low: expected - delta,
                high: expected + delta,
            }
        }
        ComparisonMode::Truncated => {
            // Integer baseline scaled by a fractional deviation, then truncated.
            let expected = expected.trunc();
            let delta = expected * (deviation_percent / 100.0);
            ToleranceBand {
                expected,
                deviation_percent,
                low: (expected - delta).trunc(),
                high: (expected + delta).trunc(),
            }
        }
    };

    if band.expected <= 0.0 {
        return Err(Error::invalid_config(format!(
            "baseline must be positive, got {}",
            band.expected
        )));
    }
    Ok(band)
}

fn check_expected(metric: Metric, expected: f64) -> Result<()> {
    if !expected.is_finite() || expected <= 0.0 {
        return Err(Error::invalid_config(format!(
            "{metric} baseline must be a positive number, got {expected}"
        )));
    }
    Ok(())
}

fn check_deviation(deviation_percent: f64) -> Result<()> {
    if !deviation_percent.is_finite() || deviation_percent < 0.0 {
        return Err(Error::invalid_config(format!(
            "deviation percentage must be a non-negative number, got {deviation_percent}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_symmetric() {
        let band = compute_band(100.0, 10.0).unwrap();
        assert_eq!(band.low, 90.0);
        assert_eq!(band.high, 110.0);
        assert_eq!(band.expected, 100.0);
    }

    #[test]
    fn test_band_brackets_expected() {
        let expected = [0.001, 1.0, 95.5, 1394.32, 250_000.0];
        let deviations = [0.0, 0.5, 5.0, 10.0, 33.3, 100.0, 250.0];
        for &e in &expected {
            for &d in &deviations {
                for mode in [ComparisonMode::Float, ComparisonMode::Truncated] {
                    let Ok(band) = compute_band_with_mode(e, d, mode) else {
                        // Sub-unit baselines truncate to zero.
                        assert_eq!(mode, ComparisonMode::Truncated);
                        assert!(e < 1.0);
                        continue;
                    };
                    assert!(band.low <= band.expected, "{e} {d} {mode:?}");
                    assert!(band.expected <= band.high, "{e} {d} {mode:?}");
                }
            }
        }
    }

    #[test]
    fn test_band_is_deterministic() {
        let a = compute_band(1394.32, 7.5).unwrap();
        let b = compute_band(1394.32, 7.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_deviation_collapses_band() {
        let band = compute_band(42.0, 0.0).unwrap();
        assert_eq!(band.low, 42.0);
        assert_eq!(band.high, 42.0);
        assert!(!band.is_below(42.0) && !band.is_above(42.0));
        assert!(band.is_below(41.999));
        assert!(band.is_above(42.001));
    }

    #[test]
    fn test_negative_deviation_rejected() {
        let err = compute_band(100.0, -1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(compute_band(100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_non_positive_baseline_rejected() {
        assert!(compute_band(0.0, 5.0).is_err());
        assert!(compute_band(-10.0, 5.0).is_err());
        assert!(compute_band(f64::INFINITY, 5.0).is_err());
        assert!(Baseline::new(0.0, 100.0, 5.0).is_err());
        assert!(Baseline::new(100.0, -3.0, 5.0).is_err());
        assert!(Baseline::new(100.0, 100.0, -5.0).is_err());
    }

    #[test]
    fn test_truncated_band_matches_integer_arithmetic() {
        let band = compute_band_with_mode(100.0, 7.0, ComparisonMode::Truncated).unwrap();
        assert_eq!(band.low, 93.0);
        assert_eq!(band.high, 107.0);

        // 25 * 0.56 is 14.000000000000002, so the lower bound drops to 10.
        let band = compute_band_with_mode(25.0, 56.0, ComparisonMode::Truncated).unwrap();
        assert_eq!(band.low, 10.0);
        assert_eq!(band.high, 39.0);

        let band = compute_band_with_mode(1394.9, 5.0, ComparisonMode::Truncated).unwrap();
        assert_eq!(band.expected, 1394.0);
        assert_eq!(band.low, 1324.0);
        assert_eq!(band.high, 1463.0);
    }

    #[test]
    fn test_float_band_keeps_precision() {
        let band = compute_band(1394.9, 5.0).unwrap();
        assert!((band.low - 1325.155).abs() < 1e-9);
        assert!((band.high - 1464.645).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_bands_per_metric() {
        let baseline = Baseline::new(100.0, 200.0, 10.0).unwrap();
        let write = baseline.band(Metric::Write, ComparisonMode::Float).unwrap();
        let read = baseline.band(Metric::Read, ComparisonMode::Float).unwrap();
        assert_eq!((write.low, write.high), (90.0, 110.0));
        assert_eq!((read.low, read.high), (180.0, 220.0));
    }
}
