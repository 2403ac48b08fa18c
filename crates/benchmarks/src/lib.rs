//! Validated benchmark run records for iorgate.
//!
//! This crate provides the record written for every validated run and the
//! writers that persist those records.
//!
//! # Quick Start
//!
//! ```no_run
//! use iorgate_benchmarks::{io, BenchmarkResult};
//! use iorgate_core::{Baseline, BenchmarkMeasurement, Validator};
//! use std::path::Path;
//!
//! let validator = Validator::new(Baseline::new(1400.0, 1600.0, 5.0).unwrap());
//! let validation = validator.judge(BenchmarkMeasurement::new(1394.3, 1596.5)).unwrap();
//!
//! let result = BenchmarkResult::from_validation("testID_1", &validation);
//! io::record_result(Path::new(io::OUTPUT_DIR), result).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`result`] - The canonical `BenchmarkResult` struct
//! - [`io`] - I/O operations for reading/writing results
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod io;
pub mod markdown;
pub mod result;

pub use result::BenchmarkResult;

/// Count recorded results that satisfied their expectation.
pub fn count_passed(results: &[BenchmarkResult]) -> usize {
    results.iter().filter(|r| r.passed() == Some(true)).count()
}
