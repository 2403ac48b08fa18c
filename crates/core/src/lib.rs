// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result validation for iorgate.
//!
//! Turns the free-form text output of a parallel I/O benchmark into a
//! pass/fail verdict against a historical bandwidth baseline.
//!
//! # Quick Start
//!
//! ```
//! use iorgate_core::{Baseline, Outcome, Validator};
//!
//! let log = "\
//! Summary of all tests:
//! Operation   Max(MiB)   Min(MiB)  Mean(MiB)
//! ---------   --------   --------  ---------
//! write          90.00      80.00      85.00
//! read          100.00      96.00      98.00
//! ";
//!
//! let baseline = Baseline::new(100.0, 100.0, 10.0)?;
//! let validation = Validator::new(baseline).validate(log)?;
//! assert_eq!(validation.verdict.outcome, Outcome::RegressionWriteFail);
//! # Ok::<(), iorgate_core::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`summary`] - Summary block extraction
//! - [`tolerance`] - Baselines and tolerance bands
//! - [`verdict`] - Regression and improvement classification
//! - [`validator`] - Extraction, banding and classification in one call
//! - [`config`] - Typed run configuration

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod measurement;
pub mod summary;
pub mod tolerance;
pub mod validator;
pub mod verdict;

pub use config::{ExpectedOutcome, RunConfig};
pub use error::{Error, ParseError, Result};
pub use measurement::{BenchmarkMeasurement, Metric};
pub use summary::{extract_measurement, SummaryLayout, SUMMARY_MARKER};
pub use tolerance::{compute_band, compute_band_with_mode, Baseline, ComparisonMode, ToleranceBand};
pub use validator::{Validation, Validator};
pub use verdict::{classify, Deviation, Improvement, Outcome, Verdict};
